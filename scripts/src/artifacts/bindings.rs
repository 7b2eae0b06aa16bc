//! The generated contract bindings copied beside TypeScript artifacts

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use deploy_common::constants::{
    BINDINGS_COMMON_FILE, BINDINGS_CONTRACTS_DIR, BINDINGS_FACTORIES_DIR, FACTORY_SUFFIX,
    LOCAL_BINDINGS_DIR, TYPESCRIPT_EXTENSION,
};

use crate::{contracts, errors::ScriptError};

/// The generated binding files of a single contract, relative to the
/// bindings root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingFiles {
    /// The module shared by all generated bindings
    pub common: PathBuf,
    /// The contract's type declarations
    pub contract: PathBuf,
    /// The contract's factory
    pub factory: PathBuf,
}

impl BindingFiles {
    /// The binding files generated for the named contract
    pub fn for_contract(name: &str) -> Self {
        Self {
            common: PathBuf::from(BINDINGS_COMMON_FILE),
            contract: Path::new(BINDINGS_CONTRACTS_DIR)
                .join(format!("{name}.{TYPESCRIPT_EXTENSION}")),
            factory: Path::new(BINDINGS_FACTORIES_DIR)
                .join(format!("{name}{FACTORY_SUFFIX}.{TYPESCRIPT_EXTENSION}")),
        }
    }

    /// All of the contract's binding files
    pub fn all(&self) -> [&Path; 3] {
        [&self.common, &self.contract, &self.factory]
    }
}

/// The generated bindings of the contracts a script writes artifacts for
#[derive(Clone, Debug)]
pub struct BindingRegistry {
    /// The directory the bindings were generated into
    root: PathBuf,
    /// The binding files, keyed by contract name
    entries: BTreeMap<&'static str, BindingFiles>,
}

impl BindingRegistry {
    /// Build a registry for the named contracts, all of which must be in
    /// the contract registry
    pub fn new(root: impl Into<PathBuf>, contract_names: &[&str]) -> Result<Self, ScriptError> {
        let entries = contract_names
            .iter()
            .map(|name| {
                let spec = contracts::lookup(name)?;
                Ok((spec.name, BindingFiles::for_contract(spec.name)))
            })
            .collect::<Result<_, ScriptError>>()?;

        Ok(Self {
            root: root.into(),
            entries,
        })
    }

    /// Build a registry for the named contracts and check that all of their
    /// binding files exist
    pub fn validated(
        root: impl Into<PathBuf>,
        contract_names: &[&str],
    ) -> Result<Self, ScriptError> {
        let registry = Self::new(root, contract_names)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Check that every registered binding file exists
    pub fn validate(&self) -> Result<(), ScriptError> {
        for (name, files) in &self.entries {
            for file in files.all() {
                let path = self.root.join(file);
                if !path.is_file() {
                    return Err(ScriptError::MissingBinding(format!(
                        "{name}: {}",
                        path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// The binding files of the named contract
    pub fn get(&self, name: &str) -> Result<&BindingFiles, ScriptError> {
        self.entries.get(name).ok_or_else(|| ScriptError::UnknownContract(name.to_string()))
    }

    /// Copy a contract's binding files into the bindings directory beside an
    /// artifact, preserving their paths relative to the bindings root
    pub fn copy_into(&self, files: &BindingFiles, artifact_dir: &Path) -> Result<(), ScriptError> {
        let local_root = artifact_dir.join(LOCAL_BINDINGS_DIR);
        for file in files.all() {
            let from = self.root.join(file);
            let to = local_root.join(file);

            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScriptError::WriteArtifact(format!("{}: {e}", parent.display()))
                })?;
            }
            fs::copy(&from, &to).map_err(|e| {
                ScriptError::WriteArtifact(format!(
                    "copying {} to {}: {e}",
                    from.display(),
                    to.display()
                ))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::errors::ScriptError;

    use super::{BindingFiles, BindingRegistry};

    #[test]
    fn test_binding_files() {
        let files = BindingFiles::for_contract("PostStorage");
        assert_eq!(files.common, PathBuf::from("common.ts"));
        assert_eq!(files.contract, PathBuf::from("contracts/PostStorage.ts"));
        assert_eq!(
            files.factory,
            PathBuf::from("factories/PostStorage__factory.ts")
        );
    }

    #[test]
    fn test_unknown_contract() {
        let err = BindingRegistry::new("typechain-types", &["PostStorage", "Nope"]).unwrap_err();
        assert_eq!(err, ScriptError::UnknownContract("Nope".to_string()));

        let registry = BindingRegistry::new("typechain-types", &["PostStorage"]).unwrap();
        assert!(registry.get("PostStorage").is_ok());
        assert!(matches!(
            registry.get("AuthStorage"),
            Err(ScriptError::UnknownContract(_))
        ));
    }
}
