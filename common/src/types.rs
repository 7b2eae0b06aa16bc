//! Type definitions shared by the deployment & migration scripts

use std::fmt::{self, Display};

use alloy_primitives::Address;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ----------------
// | Environments |
// ----------------

/// The naming used for the two environment variants.
///
/// Different generations of the deploy scripts named the environments
/// differently; the scheme selects which pair of labels is used both for
/// matching the environment override and for the artifact directory name.
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TagScheme {
    /// `local` / `prod`
    #[default]
    LocalProd,
    /// `dev` / `prod`
    DevProd,
    /// `development` / `production`
    DevelopmentProduction,
}

impl TagScheme {
    /// The label of the non-production environment under this scheme
    pub fn non_production_label(self) -> &'static str {
        match self {
            TagScheme::LocalProd => "local",
            TagScheme::DevProd => "dev",
            TagScheme::DevelopmentProduction => "development",
        }
    }

    /// The label of the production environment under this scheme.
    ///
    /// This is also the exact string an environment override must equal
    /// to select production.
    pub fn production_label(self) -> &'static str {
        match self {
            TagScheme::LocalProd | TagScheme::DevProd => "prod",
            TagScheme::DevelopmentProduction => "production",
        }
    }
}

/// The two-valued environment a deployment belongs to
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EnvironmentTag {
    /// Any non-production environment, the default
    #[default]
    NonProduction,
    /// The production environment
    Production,
}

impl EnvironmentTag {
    /// The label of this environment under the given scheme
    pub fn label(self, scheme: TagScheme) -> &'static str {
        match self {
            EnvironmentTag::NonProduction => scheme.non_production_label(),
            EnvironmentTag::Production => scheme.production_label(),
        }
    }
}

/// The network & environment a script invocation deploys to.
///
/// Derived from configuration on every invocation, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentTarget {
    /// The logical network name, e.g. `kaia` or `localhost`
    pub network_name: String,
    /// The environment of the deployment
    pub environment: EnvironmentTag,
    /// The naming scheme of the environment
    pub scheme: TagScheme,
}

impl DeploymentTarget {
    /// The directory label of the target's environment
    pub fn environment_label(&self) -> &'static str {
        self.environment.label(self.scheme)
    }

    /// Whether the target is the production environment
    pub fn is_production(&self) -> bool {
        self.environment == EnvironmentTag::Production
    }
}

impl Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.network_name, self.environment_label())
    }
}

// -------------
// | Artifacts |
// -------------

/// The subset of a compiler output artifact used by the scripts.
///
/// All other compiler output fields are ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    /// The name of the compiled contract
    #[serde(default)]
    pub contract_name: String,
    /// The contract's ABI, kept as opaque JSON
    pub abi: Value,
    /// The hex-encoded creation bytecode
    #[serde(default)]
    pub bytecode: String,
}

/// A persisted record of a deployed contract's address & ABI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressAbiArtifact {
    /// The contract's ABI, exactly as found in the compiler output
    pub abi: Value,
    /// The address of the deployed contract
    pub address: String,
}

// ---------
// | Posts |
// ---------

/// A post as stored by a post storage contract.
///
/// Only the URI is carried over; whatever else the contract returns is
/// dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPost {
    /// The URI of the post's content
    pub uri: String,
}

/// A post as accepted by a post storage contract's batch ingestion method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// The account the post belongs to
    pub recipient: Address,
    /// The URI of the post's content
    pub uri: String,
}
