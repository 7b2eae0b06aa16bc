//! Generation of the address & ABI artifacts consumed by downstream tooling
//!
//! Artifacts are laid out as
//! `{base}/{network}/{environment}/[{sub_env}/]{contract}.{ext}`, where the
//! extension depends on the [`ArtifactFormat`].

pub mod bindings;
pub mod typescript;

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use deploy_common::{
    constants::{JSON_EXTENSION, TYPESCRIPT_EXTENSION},
    types::{AddressAbiArtifact, CompiledArtifact, DeploymentTarget},
};
use serde_json::Value;
use tracing::info;

use crate::{address::AddressLike, errors::ScriptError};

use self::{bindings::BindingRegistry, typescript::render_module};

/// The format in which an artifact is written
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// A plain JSON `{ abi, address }` record
    #[default]
    Json,
    /// A TypeScript module re-exporting generated contract bindings
    Typescript,
}

impl ArtifactFormat {
    /// The file extension of artifacts in this format
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Json => JSON_EXTENSION,
            ArtifactFormat::Typescript => TYPESCRIPT_EXTENSION,
        }
    }
}

/// The path at which the artifact of the given contract is written
pub fn artifact_path(
    base: &Path,
    contract: &str,
    target: &DeploymentTarget,
    sub_env: Option<&str>,
    format: ArtifactFormat,
) -> PathBuf {
    let mut path = base.join(&target.network_name).join(target.environment_label());
    if let Some(sub_env) = sub_env {
        path.push(sub_env);
    }

    path.join(format!("{contract}.{}", format.extension()))
}

/// Writes artifacts for deployed contracts beneath a fixed base directory
pub struct ArtifactWriter {
    /// The directory beneath which artifacts are laid out
    base: PathBuf,
    /// The format of the written artifacts
    format: ArtifactFormat,
    /// The generated bindings to copy beside TypeScript artifacts
    bindings: Option<BindingRegistry>,
}

impl ArtifactWriter {
    /// A writer emitting plain JSON artifacts
    pub fn json(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            format: ArtifactFormat::Json,
            bindings: None,
        }
    }

    /// A writer emitting TypeScript artifacts, copying the generated
    /// bindings of the given registry beside each one
    pub fn typescript(base: impl Into<PathBuf>, bindings: BindingRegistry) -> Self {
        Self {
            base: base.into(),
            format: ArtifactFormat::Typescript,
            bindings: Some(bindings),
        }
    }

    /// The format of the written artifacts
    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// The path at which the artifact of the given contract is written
    pub fn destination(
        &self,
        contract: &str,
        target: &DeploymentTarget,
        sub_env: Option<&str>,
    ) -> PathBuf {
        artifact_path(&self.base, contract, target, sub_env, self.format)
    }

    /// Write the artifact of a deployed contract, returning its path.
    ///
    /// `source` is the contract's compiler output; only its ABI is carried
    /// into the artifact. A raw address string is recorded exactly as given.
    /// Missing directories are created and an existing artifact is
    /// overwritten.
    ///
    /// The JSON record is written in every format: in TypeScript format the
    /// module is written beside it, so later scripts can always read the
    /// deployment back with [`read_address_artifact`].
    pub fn write(
        &self,
        contract: &str,
        source: &Path,
        address: impl Into<AddressLike>,
        target: &DeploymentTarget,
        sub_env: Option<&str>,
    ) -> Result<PathBuf, ScriptError> {
        let address = address.into().recorded()?;
        let bindings = match &self.bindings {
            Some(registry) => Some((registry, registry.get(contract)?)),
            None => None,
        };
        let abi = read_compiled_artifact(source)?.abi;

        let destination = self.destination(contract, target, sub_env);
        info!("Writing {contract} artifact to {}", destination.display());

        let dest_dir = destination.parent().ok_or_else(|| {
            ScriptError::WriteArtifact(format!("no parent for {}", destination.display()))
        })?;
        fs::create_dir_all(dest_dir)
            .map_err(|e| ScriptError::WriteArtifact(format!("{}: {e}", dest_dir.display())))?;

        let json = render_json(&abi, &address)?;
        write_file(&destination.with_extension(JSON_EXTENSION), &json)?;

        if let Some((registry, files)) = bindings {
            let import_root = typescript::local_import_root(dest_dir);
            let module = render_module(contract, &import_root, &address, &abi)?;
            write_file(&destination, &module)?;
            registry.copy_into(files, dest_dir)?;
        }

        Ok(destination)
    }
}

/// Render a plain JSON artifact
fn render_json(abi: &Value, address: &str) -> Result<String, ScriptError> {
    let record = AddressAbiArtifact {
        abi: abi.clone(),
        address: address.to_string(),
    };

    serde_json::to_string_pretty(&record).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Write a file, replacing any previous contents
fn write_file(path: &Path, contents: &str) -> Result<(), ScriptError> {
    fs::write(path, contents)
        .map_err(|e| ScriptError::WriteArtifact(format!("{}: {e}", path.display())))
}

/// Read a contract's compiler output
pub fn read_compiled_artifact(path: &Path) -> Result<CompiledArtifact, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadArtifact(format!("{}: {e}", path.display())))?;

    let artifact: CompiledArtifact = serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

    if !artifact.abi.is_array() {
        return Err(ScriptError::ArtifactParsing(format!(
            "{}: `abi` is not an array",
            path.display()
        )));
    }

    Ok(artifact)
}

/// Read a JSON artifact written by a previous deployment
pub fn read_address_artifact(path: &Path) -> Result<AddressAbiArtifact, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadArtifact(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use deploy_common::types::{DeploymentTarget, EnvironmentTag, TagScheme};

    use super::{artifact_path, ArtifactFormat};

    fn kaia_prod() -> DeploymentTarget {
        DeploymentTarget {
            network_name: "kaia".to_string(),
            environment: EnvironmentTag::Production,
            scheme: TagScheme::DevelopmentProduction,
        }
    }

    #[test]
    fn test_artifact_path() {
        let base = Path::new("/project/abis");

        let target = kaia_prod();

        let json = artifact_path(base, "PostStorage", &target, None, ArtifactFormat::Json);
        assert_eq!(
            json,
            PathBuf::from("/project/abis/kaia/production/PostStorage.json")
        );

        let format = ArtifactFormat::Typescript;
        let module = artifact_path(base, "PostStorage", &target, Some("dev"), format);
        assert_eq!(
            module,
            PathBuf::from("/project/abis/kaia/production/dev/PostStorage.ts")
        );
    }
}
