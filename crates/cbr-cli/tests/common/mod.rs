#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use url::Url;

/// Run the CLI binary with arguments and no ambient service settings.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cbr"));
    cmd.args(args);
    cmd.env_remove("CBR_ENDPOINT");
    cmd.env_remove("AWS_REGION");
    cmd.env_remove("AWS_PROFILE");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str]) -> String {
    let output = run_cli(args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// The `file://` endpoint of a local directory.
pub fn file_endpoint(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}
