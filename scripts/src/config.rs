//! Configuration of a script invocation, read once at startup

use std::{fmt, path::PathBuf, str::FromStr};

use alloy::{signers::local::PrivateKeySigner, transports::http::reqwest::Url};
use clap::Args;
use deploy_common::{
    constants::{ABIS_DIR, ARCHIVE_DIR, GENERATED_BINDINGS_DIR, JSON_EXTENSION, LOCAL_NETWORK_ID},
    types::{DeploymentTarget, TagScheme},
};

use crate::{
    artifacts::{artifact_path, bindings::BindingRegistry, ArtifactFormat, ArtifactWriter},
    client::parse_rpc_url,
    environment::resolve_target,
    errors::ScriptError,
};

/// The networks whose RPC endpoint is known without further configuration
pub const KNOWN_NETWORKS: [(&str, &str); 2] = [
    (LOCAL_NETWORK_ID, "http://127.0.0.1:8545"),
    ("kaia_test", "https://public-en-kairos.node.kaia.io"),
];

/// The number of relayer accounts the contracts are set up with
pub const NUM_RELAYERS: usize = 3;

/// Stands in for a private key when a configuration is printed
const REDACTED: &str = "<redacted>";

/// Configuration options shared by every script, each of which may also be
/// given through the environment
#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// The network to run against, e.g. `kaia_test`
    #[arg(long, env = "NETWORK", default_value = LOCAL_NETWORK_ID)]
    pub network: String,

    /// RPC URL of the network, defaults to the known endpoint of the network
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Environment override, selects production when equal to the
    /// production label of the tag scheme
    #[arg(long = "env", env = "ENV")]
    pub env_override: Option<String>,

    /// The naming of the environments
    #[arg(
        long,
        env = "ENV_SCHEME",
        value_enum,
        default_value_t = TagScheme::default()
    )]
    pub tag_scheme: TagScheme,

    /// An optional sub-environment directory beneath the environment in
    /// the artifact layout
    #[arg(long, env = "SUB_ENV")]
    pub sub_env: Option<String>,

    /// Root of the contracts project, holding the compiler output, the
    /// generated bindings and the artifact tree
    #[arg(long, env = "PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// The format of written artifacts
    #[arg(
        long,
        env = "ARTIFACT_FORMAT",
        value_enum,
        default_value_t = ArtifactFormat::default()
    )]
    pub artifact_format: ArtifactFormat,

    /// Private key of the contracts owner
    #[arg(long, env = "CONTRACTS_OWNER_PRIVATE_KEY", hide_env_values = true)]
    pub owner_key: Option<String>,

    /// Private key of the first relayer
    #[arg(long, env = "RELAYER1_PRIVATE_KEY", hide_env_values = true)]
    pub relayer1_key: Option<String>,

    /// Private key of the second relayer
    #[arg(long, env = "RELAYER2_PRIVATE_KEY", hide_env_values = true)]
    pub relayer2_key: Option<String>,

    /// Private key of the third relayer
    #[arg(long, env = "RELAYER3_PRIVATE_KEY", hide_env_values = true)]
    pub relayer3_key: Option<String>,
}

/// The configuration of a script invocation
#[derive(Clone)]
pub struct Configuration {
    /// The identifier of the active network
    pub network_id: String,
    /// The RPC endpoint of the active network
    pub rpc_url: Url,
    /// The environment override
    pub env_override: Option<String>,
    /// The naming of the environments
    pub tag_scheme: TagScheme,
    /// The sub-environment directory of the artifact layout
    pub sub_env: Option<String>,
    /// Root of the contracts project
    pub project_root: PathBuf,
    /// The format of written artifacts
    pub artifact_format: ArtifactFormat,
    /// Private key of the contracts owner
    owner_key: Option<String>,
    /// Private keys of the relayers
    relayer_keys: [Option<String>; NUM_RELAYERS],
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| REDACTED);

        f.debug_struct("Configuration")
            .field("network_id", &self.network_id)
            .field("rpc_url", &self.rpc_url.as_str())
            .field("env_override", &self.env_override)
            .field("tag_scheme", &self.tag_scheme)
            .field("sub_env", &self.sub_env)
            .field("project_root", &self.project_root)
            .field("artifact_format", &self.artifact_format)
            .field("owner_key", &redact(&self.owner_key))
            .field("relayer_keys", &self.relayer_keys.each_ref().map(redact))
            .finish()
    }
}

impl TryFrom<ConfigArgs> for Configuration {
    type Error = ScriptError;

    fn try_from(args: ConfigArgs) -> Result<Self, Self::Error> {
        let rpc_url = match args.rpc_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => parse_rpc_url(url)?,
            None => {
                let (_, url) = KNOWN_NETWORKS
                    .iter()
                    .find(|(network, _)| *network == args.network)
                    .ok_or_else(|| {
                        ScriptError::Configuration(format!(
                            "no RPC URL given for unknown network {}",
                            args.network
                        ))
                    })?;
                parse_rpc_url(url)?
            }
        };

        Ok(Self {
            network_id: args.network,
            rpc_url,
            env_override: args.env_override,
            tag_scheme: args.tag_scheme,
            sub_env: args.sub_env.filter(|s| !s.is_empty()),
            project_root: args.project_root,
            artifact_format: args.artifact_format,
            owner_key: args.owner_key,
            relayer_keys: [args.relayer1_key, args.relayer2_key, args.relayer3_key],
        })
    }
}

impl Configuration {
    /// The deployment target of the invocation
    pub fn target(&self) -> DeploymentTarget {
        resolve_target(
            &self.network_id,
            self.env_override.as_deref(),
            self.tag_scheme,
        )
    }

    /// The signer of the contracts owner
    pub fn owner(&self) -> Result<PrivateKeySigner, ScriptError> {
        parse_signer("CONTRACTS_OWNER_PRIVATE_KEY", self.owner_key.as_deref())
    }

    /// The signer of the relayer at the given zero-based index
    pub fn relayer(&self, index: usize) -> Result<PrivateKeySigner, ScriptError> {
        let name = format!("RELAYER{}_PRIVATE_KEY", index + 1);
        let key = self.relayer_keys.get(index).ok_or_else(|| {
            ScriptError::Configuration(format!("only {NUM_RELAYERS} relayers are supported"))
        })?;

        parse_signer(&name, key.as_deref())
    }

    /// The signers of all relayers
    pub fn relayers(&self) -> Result<Vec<PrivateKeySigner>, ScriptError> {
        (0..NUM_RELAYERS).map(|i| self.relayer(i)).collect()
    }

    /// The directory of the artifact tree
    pub fn abis_dir(&self) -> PathBuf {
        self.project_root.join(ABIS_DIR)
    }

    /// The directory of the generated bindings
    pub fn bindings_dir(&self) -> PathBuf {
        self.project_root.join(GENERATED_BINDINGS_DIR)
    }

    /// The artifact writer for the given contracts.
    ///
    /// When writing TypeScript artifacts, the generated bindings of every
    /// contract are checked up front so that a missing binding fails the
    /// script before anything is deployed.
    pub fn artifact_writer(&self, contracts: &[&str]) -> Result<ArtifactWriter, ScriptError> {
        match self.artifact_format {
            ArtifactFormat::Json => Ok(ArtifactWriter::json(self.abis_dir())),
            ArtifactFormat::Typescript => {
                let bindings = BindingRegistry::validated(self.bindings_dir(), contracts)?;
                Ok(ArtifactWriter::typescript(self.abis_dir(), bindings))
            }
        }
    }

    /// The path of the JSON artifact of a contract deployed to the target
    pub fn deployed_artifact_path(&self, contract: &str) -> PathBuf {
        artifact_path(
            &self.abis_dir(),
            contract,
            &self.target(),
            self.sub_env.as_deref(),
            ArtifactFormat::Json,
        )
    }

    /// The path of the JSON artifact of a contract from the previous
    /// deployment generation
    pub fn archived_artifact_path(&self, contract: &str) -> PathBuf {
        self.project_root
            .join(ARCHIVE_DIR)
            .join(ABIS_DIR)
            .join(self.target().environment_label())
            .join(format!("{contract}.{JSON_EXTENSION}"))
    }
}

/// Parse a private key, treating an empty key as missing
fn parse_signer(name: &str, key: Option<&str>) -> Result<PrivateKeySigner, ScriptError> {
    let key = key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ScriptError::Configuration(format!("{name} is not set")))?;

    PrivateKeySigner::from_str(key)
        .map_err(|_| ScriptError::Configuration(format!("{name} is not a valid private key")))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use deploy_common::types::TagScheme;

    use crate::{artifacts::ArtifactFormat, errors::ScriptError};

    use super::{ConfigArgs, Configuration};

    /// The first default account of a local development node
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    fn args(network: &str) -> ConfigArgs {
        ConfigArgs {
            network: network.to_string(),
            rpc_url: None,
            env_override: None,
            tag_scheme: TagScheme::LocalProd,
            sub_env: None,
            project_root: PathBuf::from("/project"),
            artifact_format: ArtifactFormat::Json,
            owner_key: None,
            relayer1_key: None,
            relayer2_key: None,
            relayer3_key: None,
        }
    }

    #[test]
    fn test_known_network_rpc_url() {
        let config = Configuration::try_from(args("kaia_test")).unwrap();
        assert_eq!(
            config.rpc_url.as_str(),
            "https://public-en-kairos.node.kaia.io/"
        );
        assert_eq!(config.target().network_name, "kaia");

        let config = Configuration::try_from(args("hardhat")).unwrap();
        assert_eq!(config.target().network_name, "localhost");
    }

    #[test]
    fn test_unknown_network_requires_rpc_url() {
        let err = Configuration::try_from(args("sepolia_test")).unwrap_err();
        assert!(matches!(err, ScriptError::Configuration(_)));

        let mut with_url = args("sepolia_test");
        with_url.rpc_url = Some("http://localhost:9545".to_string());
        assert!(Configuration::try_from(with_url).is_ok());
    }

    #[test]
    fn test_missing_keys() {
        let mut args = args("hardhat");
        args.relayer1_key = Some(String::new());
        args.relayer2_key = Some("not a key".to_string());
        args.relayer3_key = Some(DEV_KEY.to_string());
        let config = Configuration::try_from(args).unwrap();

        assert_eq!(
            config.owner().unwrap_err(),
            ScriptError::Configuration("CONTRACTS_OWNER_PRIVATE_KEY is not set".to_string())
        );
        assert_eq!(
            config.relayer(0).unwrap_err(),
            ScriptError::Configuration("RELAYER1_PRIVATE_KEY is not set".to_string())
        );
        let invalid = "RELAYER2_PRIVATE_KEY is not a valid private key".to_string();
        assert_eq!(
            config.relayer(1).unwrap_err(),
            ScriptError::Configuration(invalid)
        );
        assert!(config.relayer(2).is_ok());
        assert!(config.relayers().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let mut args = args("hardhat");
        args.owner_key = Some(DEV_KEY.to_string());
        args.relayer2_key = Some(DEV_KEY.to_string());
        let config = Configuration::try_from(args).unwrap();

        let printed = format!("{config:?}");
        assert!(!printed.contains(&DEV_KEY[2..]));
        let owner = r#"owner_key: Some("<redacted>")"#;
        let relayers = r#"relayer_keys: [None, Some("<redacted>"), None]"#;
        assert!(printed.contains(owner));
        assert!(printed.contains(relayers));
    }

    #[test]
    fn test_artifact_paths() {
        let mut args = args("kaia_test");
        args.env_override = Some("production".to_string());
        args.tag_scheme = TagScheme::DevelopmentProduction;
        args.sub_env = Some("dev".to_string());
        let config = Configuration::try_from(args).unwrap();

        assert_eq!(
            config.deployed_artifact_path("AuthStorage"),
            PathBuf::from("/project/abis/kaia/production/dev/AuthStorage.json")
        );
        assert_eq!(
            config.archived_artifact_path("PostStorage"),
            PathBuf::from("/project/archive/abis/production/PostStorage.json")
        );
    }

    #[test]
    fn test_args_from_command_line() {
        let cli = TestCli::try_parse_from([
            "test",
            "--network",
            "kaia_test",
            "--env",
            "prod",
            "--artifact-format",
            "typescript",
            "--tag-scheme",
            "dev-prod",
        ])
        .unwrap();

        assert_eq!(cli.config.artifact_format, ArtifactFormat::Typescript);
        assert_eq!(cli.config.tag_scheme, TagScheme::DevProd);

        let config = Configuration::try_from(cli.config).unwrap();
        assert!(config.target().is_production());
        assert_eq!(config.target().environment_label(), "prod");
    }
}
