//! The registry of contracts managed by the deployment scripts

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use deploy_common::constants::{
    COMPILED_ARTIFACTS_DIR, COMPILED_CONTRACTS_DIR, JSON_EXTENSION, SOLIDITY_EXTENSION,
};

use crate::errors::ScriptError;

/// A contract known to the scripts
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContractSpec {
    /// The contract name, as declared in its Solidity source
    pub name: &'static str,
    /// The directory of the contract's source, relative to the contracts
    /// root, or `None` for contracts at the root
    pub source_dir: Option<&'static str>,
}

impl ContractSpec {
    /// The path of the contract's compiler output, relative to the project root
    pub fn compiled_artifact_path(&self) -> PathBuf {
        let mut path = PathBuf::from(COMPILED_ARTIFACTS_DIR).join(COMPILED_CONTRACTS_DIR);
        if let Some(dir) = self.source_dir {
            path.push(dir);
        }
        path.join(format!("{}.{SOLIDITY_EXTENSION}", self.name))
            .join(format!("{}.{JSON_EXTENSION}", self.name))
    }

    /// The absolute path of the contract's compiler output
    pub fn compiled_artifact_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.compiled_artifact_path())
    }
}

impl Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The relayer manager, tracking the accounts allowed to relay transactions
pub const RELAYER_MANAGER: ContractSpec = ContractSpec {
    name: "RelayerManager",
    source_dir: None,
};
/// The forwarder through which relayed transactions are submitted
pub const IN_FORWARDER: ContractSpec = ContractSpec {
    name: "InForwarder",
    source_dir: None,
};
/// The user authentication storage
pub const AUTH_STORAGE: ContractSpec = ContractSpec {
    name: "AuthStorage",
    source_dir: None,
};
/// The passkey storage
pub const PASSKEY_STORAGE: ContractSpec = ContractSpec {
    name: "PasskeyStorage",
    source_dir: None,
};
/// The visitor storage
pub const VISITOR_STORAGE: ContractSpec = ContractSpec {
    name: "VisitorStorage",
    source_dir: None,
};
/// The post storage
pub const POST_STORAGE: ContractSpec = ContractSpec {
    name: "PostStorage",
    source_dir: None,
};
/// The education ledger implementation
pub const EDU_LEDGER: ContractSpec = ContractSpec {
    name: "EduLedger",
    source_dir: Some("edu-ledger"),
};
/// The proxy fronting the education ledger
pub const EDU_LEDGER_PROXY: ContractSpec = ContractSpec {
    name: "EduLedgerProxy",
    source_dir: Some("edu-ledger"),
};
/// The read-only view over the education ledger
pub const VIEW_EDU: ContractSpec = ContractSpec {
    name: "ViewEdu",
    source_dir: Some("edu-ledger"),
};
/// The role registry of the education contracts
pub const IN_AUTHENTICATOR: ContractSpec = ContractSpec {
    name: "InAuthenticator",
    source_dir: Some("auth"),
};
/// The instructor ledger
pub const INSTRUCTOR_LEDGER: ContractSpec = ContractSpec {
    name: "InstructorLedger",
    source_dir: Some("instructor-ledger"),
};

/// Every contract known to the scripts
pub const CONTRACTS: [ContractSpec; 11] = [
    RELAYER_MANAGER,
    IN_FORWARDER,
    AUTH_STORAGE,
    PASSKEY_STORAGE,
    VISITOR_STORAGE,
    POST_STORAGE,
    EDU_LEDGER,
    EDU_LEDGER_PROXY,
    VIEW_EDU,
    IN_AUTHENTICATOR,
    INSTRUCTOR_LEDGER,
];

/// Look up a contract by name
pub fn lookup(name: &str) -> Result<ContractSpec, ScriptError> {
    CONTRACTS
        .iter()
        .find(|contract| contract.name == name)
        .copied()
        .ok_or_else(|| ScriptError::UnknownContract(name.to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{lookup, EDU_LEDGER, POST_STORAGE};

    #[test]
    fn test_compiled_artifact_path() {
        assert_eq!(
            POST_STORAGE.compiled_artifact_path(),
            PathBuf::from("artifacts/contracts/PostStorage.sol/PostStorage.json")
        );

        let edu_ledger = "artifacts/contracts/edu-ledger/EduLedger.sol/EduLedger.json";
        assert_eq!(
            EDU_LEDGER.compiled_artifact_path(),
            PathBuf::from(edu_ledger)
        );
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("PostStorage").unwrap(), POST_STORAGE);
        assert!(lookup("postStorage").is_err());
        assert!(lookup("Treasury").is_err());
    }
}
