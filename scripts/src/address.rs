//! Normalization of the address forms accepted by the scripts

use std::str::FromStr;

use alloy::primitives::Address;

use crate::errors::ScriptError;

/// An address as handed to the scripts: either an unvalidated string, e.g.
/// read from the environment or an artifact, or an already-resolved address,
/// e.g. taken from a deployment receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressLike {
    /// A raw, unvalidated address string
    Raw(String),
    /// A resolved address
    Resolved(Address),
}

impl AddressLike {
    /// Validate the address
    pub fn resolve(&self) -> Result<Address, ScriptError> {
        match self {
            AddressLike::Raw(s) => Address::from_str(s.trim())
                .map_err(|e| ScriptError::InvalidAddress(format!("{s}: {e}"))),
            AddressLike::Resolved(address) => Ok(*address),
        }
    }

    /// Validate the address and render the form recorded in an artifact.
    ///
    /// A raw string is recorded exactly as given, a resolved address in its
    /// checksummed form.
    pub fn recorded(&self) -> Result<String, ScriptError> {
        match self {
            AddressLike::Raw(s) => self.resolve().map(|_| s.clone()),
            AddressLike::Resolved(address) => Ok(address.to_checksum(None /* chain_id */)),
        }
    }
}

impl From<Address> for AddressLike {
    fn from(address: Address) -> Self {
        AddressLike::Resolved(address)
    }
}

impl From<String> for AddressLike {
    fn from(s: String) -> Self {
        AddressLike::Raw(s)
    }
}

impl From<&str> for AddressLike {
    fn from(s: &str) -> Self {
        AddressLike::Raw(s.to_string())
    }
}

/// Parse an address string
pub fn parse_address(s: &str) -> Result<Address, ScriptError> {
    AddressLike::from(s).resolve()
}
