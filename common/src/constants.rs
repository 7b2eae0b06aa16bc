//! Constants describing the on-disk layout of the contracts project

/// The network identifier of the local simulation network.
///
/// Deployments against this network always resolve to the
/// [`LOCALHOST_NETWORK_NAME`] network in the non-production environment.
pub const LOCAL_NETWORK_ID: &str = "hardhat";

/// The network name under which local deployments are recorded
pub const LOCALHOST_NETWORK_NAME: &str = "localhost";

/// The separator between the network name and the chain environment in a
/// network identifier, e.g. `kaia_test`
pub const NETWORK_ID_SEPARATOR: char = '_';

/// The directory, relative to the project root, holding compiler output
pub const COMPILED_ARTIFACTS_DIR: &str = "artifacts";

/// The directory, under [`COMPILED_ARTIFACTS_DIR`], holding contract output
pub const COMPILED_CONTRACTS_DIR: &str = "contracts";

/// The extension of a Solidity source file, used as a directory name by the
/// compiler's output layout
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The directory, relative to the project root, to which address & ABI
/// artifacts are written
pub const ABIS_DIR: &str = "abis";

/// The directory, relative to the project root, holding artifacts of a
/// previous deployment generation
pub const ARCHIVE_DIR: &str = "archive";

/// The directory, relative to the project root, holding generated contract
/// bindings
pub const GENERATED_BINDINGS_DIR: &str = "typechain-types";

/// The directory, beside a generated-binding artifact, into which the
/// bindings it imports are copied
pub const LOCAL_BINDINGS_DIR: &str = "typechain";

/// The shared module of the generated bindings
pub const BINDINGS_COMMON_FILE: &str = "common.ts";

/// The sub-directory of the generated bindings holding contract type
/// declarations
pub const BINDINGS_CONTRACTS_DIR: &str = "contracts";

/// The sub-directory of the generated bindings holding contract factories
pub const BINDINGS_FACTORIES_DIR: &str = "factories";

/// The suffix appended to a contract name to form its factory name
pub const FACTORY_SUFFIX: &str = "__factory";

/// The extension of a plain JSON artifact
pub const JSON_EXTENSION: &str = "json";

/// The extension of a generated-binding artifact
pub const TYPESCRIPT_EXTENSION: &str = "ts";
