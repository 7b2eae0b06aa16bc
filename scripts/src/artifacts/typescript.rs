//! Rendering of TypeScript artifacts re-exporting generated contract bindings

use std::path::{Component, Path, PathBuf};

use deploy_common::constants::{
    BINDINGS_CONTRACTS_DIR, BINDINGS_FACTORIES_DIR, FACTORY_SUFFIX, LOCAL_BINDINGS_DIR,
};
use serde_json::Value;

use crate::errors::ScriptError;

/// The path of `to` relative to the directory `from_dir`.
///
/// Both paths are expected to be rooted the same way, i.e. both absolute or
/// both relative to the same directory.
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let shared = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in shared..from.len() {
        relative.push(Component::ParentDir);
    }
    for component in &to[shared..] {
        relative.push(component);
    }

    relative
}

/// Normalize a relative path into a module import specifier: forward
/// slashes only, and explicitly relative
pub fn normalize_import_path(relative: &str) -> String {
    let normalized = relative.replace('\\', "/");
    if normalized.is_empty() {
        return ".".to_string();
    }

    if normalized.starts_with('.') {
        normalized
    } else {
        format!("./{normalized}")
    }
}

/// The import specifier of the bindings directory beside an artifact in
/// `artifact_dir`
pub fn local_import_root(artifact_dir: &Path) -> String {
    let bindings_root = artifact_dir.join(LOCAL_BINDINGS_DIR);
    import_root(artifact_dir, &bindings_root)
}

/// The import specifier of `bindings_root` from a module in `artifact_dir`
pub fn import_root(artifact_dir: &Path, bindings_root: &Path) -> String {
    let relative = relative_path(artifact_dir, bindings_root);
    normalize_import_path(&relative.to_string_lossy())
}

/// Render the TypeScript module for a deployed contract.
///
/// The output depends only on its inputs, so re-rendering an unchanged
/// deployment yields identical bytes.
pub fn render_module(
    contract: &str,
    import_root: &str,
    address: &str,
    abi: &Value,
) -> Result<String, ScriptError> {
    let factory = format!("{contract}{FACTORY_SUFFIX}");
    let contract_import = format!("{import_root}/{BINDINGS_CONTRACTS_DIR}/{contract}");
    let factory_import = format!("{import_root}/{BINDINGS_FACTORIES_DIR}/{factory}");

    let address = serde_json::to_string(address).map_err(map_serde_error)?;
    let abi = serde_json::to_string_pretty(abi).map_err(map_serde_error)?;

    Ok(format!(
        r#"import type {{ ContractRunner }} from "ethers";
import type {{ {contract} }} from "{contract_import}";
import {{ {factory} }} from "{factory_import}";

export const address = {address} as const;
export const abi = {abi} as const;
export type {{ {contract} }};

export const bytecode = {factory}.bytecode;
export const createInterface = {factory}.createInterface;
export const connect = (
  runner?: ContractRunner | null,
): {contract} => {factory}.connect(address, runner);
"#
    ))
}

/// Map a JSON serialization error to a script error
fn map_serde_error(e: serde_json::Error) -> ScriptError {
    ScriptError::ArtifactParsing(e.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use serde_json::json;

    use super::{
        import_root, local_import_root, normalize_import_path, relative_path, render_module,
    };

    #[test]
    fn test_relative_path() {
        let dir = Path::new("/project/abis/kaia/local");
        assert_eq!(
            relative_path(dir, Path::new("/project/abis/kaia/local/typechain")),
            PathBuf::from("typechain")
        );
        assert_eq!(
            relative_path(dir, Path::new("/project/typechain-types")),
            PathBuf::from("../../../typechain-types")
        );
        assert_eq!(relative_path(dir, dir), PathBuf::new());
    }

    #[test]
    fn test_normalize_import_path() {
        assert_eq!(normalize_import_path("typechain"), "./typechain");
        assert_eq!(
            normalize_import_path("../../typechain-types"),
            "../../typechain-types"
        );
        assert_eq!(
            normalize_import_path("..\\..\\typechain-types"),
            "../../typechain-types"
        );
        assert_eq!(
            normalize_import_path("nested\\typechain"),
            "./nested/typechain"
        );
        assert_eq!(normalize_import_path(""), ".");
    }

    #[test]
    fn test_import_root_at_depth() {
        let bindings = Path::new("/project/typechain-types");
        for depth in 1..5 {
            let mut dir = PathBuf::from("/project");
            for i in 0..depth {
                dir.push(format!("level{i}"));
            }

            let expected = vec![".."; depth].join("/") + "/typechain-types";
            assert_eq!(import_root(&dir, bindings), expected);
        }

        let artifact_dir = Path::new("/project/abis/kaia/prod/dev");
        assert_eq!(local_import_root(artifact_dir), "./typechain");
    }

    #[test]
    fn test_render_module() {
        let abi = json!([{"type": "function", "name": "getPosts", "inputs": []}]);
        let module = render_module(
            "PostStorage",
            "./typechain",
            "0x3E02CfDDc62cBBCC7F51a5cDf584122ef1b4048f",
            &abi,
        )
        .unwrap();

        assert!(module.contains(
            r#"import type { PostStorage } from "./typechain/contracts/PostStorage";"#
        ));
        assert!(module.contains(
            r#"import { PostStorage__factory } from "./typechain/factories/PostStorage__factory";"#
        ));
        assert!(module.contains(
            r#"export const address = "0x3E02CfDDc62cBBCC7F51a5cDf584122ef1b4048f" as const;"#
        ));
        assert!(module.contains("export const abi = [\n  {\n    \"type\": \"function\","));
        assert!(module.contains(
            "): PostStorage => PostStorage__factory.connect(address, runner);"
        ));
        assert!(module.ends_with(";\n"));
    }
}
