use predicates::prelude::*;

use crate::sisense;

#[test]
fn cli_version() {
    let dir = tempfile::tempdir().unwrap();
    sisense(dir.path())
        .args(["version"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "sisense {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn version_needs_no_config() {
    let dir = tempfile::tempdir().unwrap();
    sisense(dir.path()).args(["--version"]).assert().success();
}
