//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A required configuration value is missing or malformed
    Configuration(String),
    /// Error reading an artifact or generated binding from disk
    ReadArtifact(String),
    /// Error writing an artifact or copying a generated binding
    WriteArtifact(String),
    /// Error parsing a compiler output or address artifact
    ArtifactParsing(String),
    /// The named contract is not in the contract registry
    UnknownContract(String),
    /// A generated binding file expected for a contract does not exist
    MissingBinding(String),
    /// A string could not be parsed as an address
    InvalidAddress(String),
    /// Error returned by the RPC provider
    Rpc(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method, or a reverted transaction
    ContractInteraction(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Configuration(s) => write!(f, "configuration error: {}", s),
            ScriptError::ReadArtifact(s) => write!(f, "error reading artifact: {}", s),
            ScriptError::WriteArtifact(s) => write!(f, "error writing artifact: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::UnknownContract(s) => write!(f, "unknown contract: {}", s),
            ScriptError::MissingBinding(s) => write!(f, "missing generated binding: {}", s),
            ScriptError::InvalidAddress(s) => write!(f, "invalid address: {}", s),
            ScriptError::Rpc(s) => write!(f, "rpc error: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
        }
    }
}

impl Error for ScriptError {}
