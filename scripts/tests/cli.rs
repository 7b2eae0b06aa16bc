//! Tests of the deploy scripts binary

use std::process::Command;

use eyre::Result;
use tempfile::TempDir;

#[test]
fn test_logs_to_stderr() -> Result<()> {
    let dir = TempDir::new()?;
    let output = Command::new(env!("CARGO_BIN_EXE_deploy-scripts"))
        .current_dir(dir.path())
        .env("RUST_LOG", "info")
        .args(["--network", "hardhat"])
        .args(["--rpc-url", "http://127.0.0.1:8545"])
        .args(["show-posts", "0x1234"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("invalid address"));

    Ok(())
}
