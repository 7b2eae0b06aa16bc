//! Utilities for connecting to the chain, deploying contracts & sending transactions

use std::path::Path;

use alloy::{
    contract::{CallBuilder, CallDecoder, ContractInstance, Interface},
    dyn_abi::DynSolValue,
    json_abi::{Function, JsonAbi},
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use deploy_common::types::AddressAbiArtifact;
use tracing::{debug, info};

use crate::{
    address::parse_address,
    artifacts::{read_address_artifact, read_compiled_artifact},
    contracts::ContractSpec,
    errors::ScriptError,
};

/// The provider type used by the scripts
pub type Wallet = DynProvider<Ethereum>;

/// The call builder type used by the scripts
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a Wallet, C, Ethereum>;

/// Parse an RPC URL
pub fn parse_rpc_url(rpc_url: &str) -> Result<Url, ScriptError> {
    Url::parse(rpc_url)
        .map_err(|e| ScriptError::Configuration(format!("rpc url {rpc_url}: {e}")))
}

/// Sets up a client that signs & sends transactions with the given signer
pub fn setup_client(signer: PrivateKeySigner, rpc_url: &Url) -> Wallet {
    let provider = ProviderBuilder::new()
        .wallet(signer)
        .connect_http(rpc_url.clone());
    DynProvider::new(provider)
}

/// Sets up a client that can only read chain state
pub fn setup_read_client(rpc_url: &Url) -> Wallet {
    let provider = ProviderBuilder::new().connect_http(rpc_url.clone());
    DynProvider::new(provider)
}

/// Deploys contracts from their compiler output on behalf of a single signer
#[derive(Clone)]
pub struct Deployer {
    /// The client through which deployments are sent
    client: Wallet,
    /// The address of the deploying account
    address: Address,
}

impl Deployer {
    /// Create a deployer for the given signer
    pub fn new(signer: PrivateKeySigner, rpc_url: &Url) -> Self {
        let address = signer.address();
        Self {
            client: setup_client(signer, rpc_url),
            address,
        }
    }

    /// The address of the deploying account
    pub fn address(&self) -> Address {
        self.address
    }

    /// The client through which transactions are sent
    pub fn client(&self) -> &Wallet {
        &self.client
    }

    /// Check that the RPC endpoint is reachable, returning its chain ID
    pub async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.client
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::Rpc(e.to_string()))
    }

    /// Deploy a contract, waiting for the deployment to be confirmed.
    ///
    /// `constructor_args` are the ABI-encoded constructor arguments, empty
    /// for contracts without a constructor.
    pub async fn deploy(
        &self,
        contract: &ContractSpec,
        project_root: &Path,
        constructor_args: Vec<u8>,
    ) -> Result<Address, ScriptError> {
        info!("Deploying {contract} with the account: {}", self.address);

        let artifact = read_compiled_artifact(&contract.compiled_artifact_in(project_root))?;
        let bytecode: Bytes = artifact
            .bytecode
            .parse()
            .map_err(|e| ScriptError::ArtifactParsing(format!("{contract} bytecode: {e}")))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{contract} has no creation bytecode"
            )));
        }

        let mut deploy_code = bytecode.to_vec();
        deploy_code.extend_from_slice(&constructor_args);
        let tx = TransactionRequest::default().with_deploy_code(deploy_code);

        let receipt = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{contract}: {e}")))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{contract}: {e}")))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "{contract} deployment {:#x} reverted",
                receipt.transaction_hash
            )));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("no contract address in {contract} receipt"))
        })?;
        info!("{contract} contract deployed at: {address}");

        Ok(address)
    }
}

/// Send a transaction and wait for it to be confirmed, failing if it reverts
pub async fn send_tx<C: CallDecoder>(
    tx: ScriptCallBuilder<'_, C>,
) -> Result<TransactionReceipt, ScriptError> {
    let receipt = tx
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "transaction {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    debug!("Transaction {:#x} confirmed", receipt.transaction_hash);
    Ok(receipt)
}

/// A deployed contract known only through its address & ABI artifact
pub struct ArtifactContract {
    /// The contract instance, encoding calls from the artifact's ABI
    instance: ContractInstance<Wallet>,
    /// The account view calls are made from, if any
    caller: Option<Address>,
}

impl ArtifactContract {
    /// Bind to the contract described by an address & ABI artifact
    pub fn new(artifact: AddressAbiArtifact, client: Wallet) -> Result<Self, ScriptError> {
        let address = parse_address(&artifact.address)?;
        let abi: JsonAbi = serde_json::from_value(artifact.abi)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        let instance = ContractInstance::new(address, client, Interface::new(abi));
        Ok(Self {
            instance,
            caller: None,
        })
    }

    /// Bind to the contract described by the artifact at the given path
    pub fn load(path: &Path, client: Wallet) -> Result<Self, ScriptError> {
        Self::new(read_address_artifact(path)?, client)
    }

    /// Make view calls from the given account, for methods restricted by
    /// `msg.sender`
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }

    /// The address of the contract
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// The ABI of the contract
    pub fn abi(&self) -> &JsonAbi {
        self.instance.abi()
    }

    /// Build a call of the given method
    pub fn method(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<ScriptCallBuilder<'_, Function>, ScriptError> {
        let call = self
            .instance
            .function(method, args)
            .map_err(|e| ScriptError::ContractInteraction(format!("{method}: {e}")))?;

        Ok(match self.caller {
            Some(caller) => call.from(caller),
            None => call,
        })
    }

    /// Call a view method
    pub async fn call(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ScriptError> {
        self.method(method, args)?
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(format!("{method}: {e}")))
    }

    /// Send a transaction calling a state-changing method, waiting for it to
    /// be confirmed
    pub async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TransactionReceipt, ScriptError> {
        send_tx(self.method(method, args)?).await
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use deploy_common::types::AddressAbiArtifact;
    use serde_json::json;

    use super::{parse_rpc_url, setup_read_client, ArtifactContract};

    fn auth_storage() -> AddressAbiArtifact {
        AddressAbiArtifact {
            abi: json!([{
                "type": "function",
                "name": "getUserAddresses",
                "stateMutability": "view",
                "inputs": [],
                "outputs": [{"name": "", "type": "address[]", "internalType": "address[]"}]
            }]),
            address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
        }
    }

    #[test]
    fn test_view_calls_from_caller() {
        let client = setup_read_client(&parse_rpc_url("http://127.0.0.1:8545").unwrap());
        let relayer = Address::repeat_byte(0x42);

        let anonymous = ArtifactContract::new(auth_storage(), client.clone()).unwrap();
        let request = anonymous
            .method("getUserAddresses", &[])
            .unwrap()
            .into_transaction_request();
        assert_eq!(request.from, None);

        let contract = ArtifactContract::new(auth_storage(), client)
            .unwrap()
            .with_caller(relayer);
        let request = contract
            .method("getUserAddresses", &[])
            .unwrap()
            .into_transaction_request();
        assert_eq!(request.from, Some(relayer));
    }

    #[test]
    fn test_unknown_method() {
        let client = setup_read_client(&parse_rpc_url("http://127.0.0.1:8545").unwrap());
        let contract = ArtifactContract::new(auth_storage(), client).unwrap();

        assert!(contract.method("getPosts", &[]).is_err());
    }
}
