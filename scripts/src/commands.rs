//! Implementations of the deployment & migration scripts

use std::path::PathBuf;

use alloy::{primitives::Address, signers::local::PrivateKeySigner, sol_types::SolValue};
use deploy_common::types::DeploymentTarget;
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    address::parse_address,
    artifacts::{read_address_artifact, ArtifactWriter},
    client::{send_tx, setup_client, setup_read_client, ArtifactContract, Deployer, Wallet},
    config::Configuration,
    contracts::{
        ContractSpec, AUTH_STORAGE, EDU_LEDGER, EDU_LEDGER_PROXY, INSTRUCTOR_LEDGER,
        IN_AUTHENTICATOR, IN_FORWARDER, POST_STORAGE, RELAYER_MANAGER, VIEW_EDU,
    },
    errors::ScriptError,
    migration::{replay, user_addresses, PostSource, PostStorage},
    solidity::{IEduLedger, IInAuthenticator, IRelayerManager},
};

// --------------
// | Deployment |
// --------------

/// A deployment of one or more contracts by a single signer
struct Deployment<'a> {
    /// The configuration of the invocation
    config: &'a Configuration,
    /// The target deployed to
    target: DeploymentTarget,
    /// The deployer of the contracts
    deployer: Deployer,
    /// The writer of the contracts' artifacts
    writer: ArtifactWriter,
}

impl<'a> Deployment<'a> {
    /// Prepare a deployment of the given contracts.
    ///
    /// Everything that can be checked locally is checked before the RPC
    /// endpoint is first contacted.
    async fn prepare(
        config: &'a Configuration,
        signer: PrivateKeySigner,
        contracts: &[ContractSpec],
    ) -> Result<Self, ScriptError> {
        let target = config.target();
        let names = contracts.iter().map(|contract| contract.name).collect_vec();
        let writer = config.artifact_writer(&names)?;
        for contract in contracts {
            let path = contract.compiled_artifact_in(&config.project_root);
            if !path.is_file() {
                return Err(ScriptError::ReadArtifact(format!(
                    "no compiler output for {contract} at {}",
                    path.display()
                )));
            }
        }

        info!("Deploying to {target}");
        if target.is_production() {
            warn!("Deploying to the PRODUCTION environment");
        }

        let deployer = Deployer::new(signer, &config.rpc_url);
        let chain_id = deployer.chain_id().await?;
        info!("Connected to chain {chain_id} at {}", config.rpc_url);

        Ok(Self {
            config,
            target,
            deployer,
            writer,
        })
    }

    /// The client of the deploying account
    fn client(&self) -> Wallet {
        self.deployer.client().clone()
    }

    /// Deploy a contract with the given ABI-encoded constructor arguments
    async fn deploy(
        &self,
        contract: &ContractSpec,
        constructor_args: Vec<u8>,
    ) -> Result<Address, ScriptError> {
        self.deployer.deploy(contract, &self.config.project_root, constructor_args).await
    }

    /// Write the artifact of a deployed contract
    fn write_artifact(&self, contract: &ContractSpec, address: Address) -> Result<(), ScriptError> {
        let source = contract.compiled_artifact_in(&self.config.project_root);
        let path = self.writer.write(
            contract.name,
            &source,
            address,
            &self.target,
            self.config.sub_env.as_deref(),
        )?;

        info!("{contract} artifact written to {}", path.display());
        Ok(())
    }
}

/// Resolve an address given explicitly, or else recorded in the artifact of
/// a contract previously deployed to the target
fn address_or_deployed(
    config: &Configuration,
    explicit: Option<&str>,
    contract: &ContractSpec,
) -> Result<Address, ScriptError> {
    match explicit.filter(|address| !address.is_empty()) {
        Some(address) => parse_address(address),
        None => {
            let path = config.deployed_artifact_path(contract.name);
            info!("Reading {contract} address from {}", path.display());
            parse_address(&read_address_artifact(&path)?.address)
        }
    }
}

/// Deploy the relayer manager and register every relayer with it
pub async fn deploy_relayer_manager(config: &Configuration) -> Result<(), ScriptError> {
    let owner = config.owner()?;
    let relayers = config.relayers()?;
    let deployment = Deployment::prepare(config, owner, &[RELAYER_MANAGER]).await?;

    let address = deployment.deploy(&RELAYER_MANAGER, Vec::new()).await?;

    let relayer_manager = IRelayerManager::new(address, deployment.client());
    for relayer in &relayers {
        info!("Add Relayer with the account: {}", relayer.address());
        send_tx(relayer_manager.addRelayer(relayer.address())).await?;
    }

    deployment.write_artifact(&RELAYER_MANAGER, address)
}

/// Deploy the forwarder, bound to the relayer manager
pub async fn deploy_in_forwarder(
    config: &Configuration,
    relayer_manager: Option<&str>,
) -> Result<(), ScriptError> {
    let owner = config.owner()?;
    let relayer_manager = address_or_deployed(config, relayer_manager, &RELAYER_MANAGER)?;
    let deployment = Deployment::prepare(config, owner, &[IN_FORWARDER]).await?;

    let constructor_args = (IN_FORWARDER.name.to_string(), relayer_manager).abi_encode_params();
    let address = deployment.deploy(&IN_FORWARDER, constructor_args).await?;

    deployment.write_artifact(&IN_FORWARDER, address)
}

/// Deploy a contract whose constructor takes no arguments
pub async fn deploy_standalone(
    config: &Configuration,
    contract: &ContractSpec,
) -> Result<(), ScriptError> {
    let owner = config.owner()?;
    let deployment = Deployment::prepare(config, owner, &[*contract]).await?;

    let address = deployment.deploy(contract, Vec::new()).await?;

    deployment.write_artifact(contract, address)
}

/// Deploy the post storage, bound to the forwarder
pub async fn deploy_post_storage(
    config: &Configuration,
    forwarder: Option<&str>,
) -> Result<(), ScriptError> {
    let owner = config.owner()?;
    let forwarder = address_or_deployed(config, forwarder, &IN_FORWARDER)?;
    info!("Using forwarder {forwarder}");
    let deployment = Deployment::prepare(config, owner, &[POST_STORAGE]).await?;

    let address = deployment.deploy(&POST_STORAGE, (forwarder,).abi_encode_params()).await?;

    deployment.write_artifact(&POST_STORAGE, address)
}

/// Deploy the education contracts behind their proxy and grant their roles.
///
/// The owner account deploys every contract and sends every role grant, so
/// on chain it owns the proxy, the authenticator & both ledgers. The first
/// relayer is only granted the manager role.
pub async fn deploy_edu_ledger(config: &Configuration) -> Result<(), ScriptError> {
    let owner = config.owner()?;
    let manager = config.relayer(0)?.address();
    let contracts = [
        EDU_LEDGER,
        EDU_LEDGER_PROXY,
        IN_AUTHENTICATOR,
        INSTRUCTOR_LEDGER,
        VIEW_EDU,
    ];
    let deployment = Deployment::prepare(config, owner, &contracts).await?;

    let edu_ledger = deployment.deploy(&EDU_LEDGER, Vec::new()).await?;
    let authenticator = deployment.deploy(&IN_AUTHENTICATOR, Vec::new()).await?;
    let instructor_ledger =
        deployment.deploy(&INSTRUCTOR_LEDGER, (authenticator,).abi_encode_params()).await?;
    let proxy = deployment.deploy(&EDU_LEDGER_PROXY, (edu_ledger,).abi_encode_params()).await?;

    info!("Initializing {EDU_LEDGER} behind {proxy}");
    let proxied_ledger = IEduLedger::new(proxy, deployment.client());
    send_tx(proxied_ledger.initialize(authenticator, instructor_ledger)).await?;

    let view = deployment.deploy(&VIEW_EDU, (proxy,).abi_encode_params()).await?;

    info!("Edu roles setting...");
    let roles = IInAuthenticator::new(authenticator, deployment.client());
    send_tx(roles.grantManager(manager)).await?;
    send_tx(roles.grantSystem(proxy)).await?;
    send_tx(roles.grantSystem(instructor_ledger)).await?;

    // The ledger is used through its proxy
    deployment.write_artifact(&EDU_LEDGER, proxy)?;
    deployment.write_artifact(&EDU_LEDGER_PROXY, proxy)?;
    deployment.write_artifact(&IN_AUTHENTICATOR, authenticator)?;
    deployment.write_artifact(&INSTRUCTOR_LEDGER, instructor_ledger)?;
    deployment.write_artifact(&VIEW_EDU, view)
}

// -------------
// | Migration |
// -------------

/// Replay every user's posts from the previous post storage into the one
/// deployed to the target.
///
/// The user list is read as the first relayer, the only account the auth
/// storage answers.
pub async fn migrate_posts(
    config: &Configuration,
    previous: Option<PathBuf>,
) -> Result<(), ScriptError> {
    let owner = config.owner()?;
    let relayer = config.relayer(0)?.address();
    let target = config.target();
    let previous_path =
        previous.unwrap_or_else(|| config.archived_artifact_path(POST_STORAGE.name));

    let reader = setup_read_client(&config.rpc_url);
    let auth_storage_path = config.deployed_artifact_path(AUTH_STORAGE.name);
    let auth_storage =
        ArtifactContract::load(&auth_storage_path, reader.clone())?.with_caller(relayer);
    let previous = PostStorage::new(ArtifactContract::load(&previous_path, reader)?);
    let next = PostStorage::new(ArtifactContract::load(
        &config.deployed_artifact_path(POST_STORAGE.name),
        setup_client(owner, &config.rpc_url),
    )?);

    let (from, to) = (previous.address(), next.address());
    info!("Migrating posts on {target} from {from} to {to}");
    let users = user_addresses(&auth_storage).await?;
    info!("Found {} users", users.len());

    let migrated = replay(&users, &previous, &next).await?;

    info!("Migration done!");
    for (user, posts) in &migrated {
        let uris = posts.iter().map(|post| &post.uri).join(", ");
        info!("{user}: [{uris}]");
    }

    Ok(())
}

/// Log the posts of a user in the post storage deployed to the target
pub async fn show_posts(config: &Configuration, user: &str) -> Result<(), ScriptError> {
    let user = parse_address(user)?;
    let post_storage = PostStorage::new(ArtifactContract::load(
        &config.deployed_artifact_path(POST_STORAGE.name),
        setup_read_client(&config.rpc_url),
    )?);

    let posts = post_storage.posts(user).await?;
    let uris = posts.iter().map(|post| &post.uri).join(", ");
    info!("{user} has {} posts: [{uris}]", posts.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use deploy_common::types::TagScheme;

    use super::migrate_posts;
    use crate::{
        artifacts::ArtifactFormat,
        config::{ConfigArgs, Configuration},
        errors::ScriptError,
    };

    /// The first development account of a local node
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_migration_requires_relayer() {
        let config = Configuration::try_from(ConfigArgs {
            network: "hardhat".to_string(),
            rpc_url: None,
            env_override: None,
            tag_scheme: TagScheme::LocalProd,
            sub_env: None,
            project_root: PathBuf::from("/project"),
            artifact_format: ArtifactFormat::Json,
            owner_key: Some(DEV_KEY.to_string()),
            relayer1_key: None,
            relayer2_key: None,
            relayer3_key: None,
        })
        .unwrap();

        let err = migrate_posts(&config, None).await.unwrap_err();
        let unset = "RELAYER1_PRIVATE_KEY is not set".to_string();
        assert_eq!(err, ScriptError::Configuration(unset));
    }
}
