use predicates::prelude::*;

use crate::{sisense, write_config};

#[test]
fn config_get_masks_token() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), 8080);

    sisense(dir.path())
        .args(["config", "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:8080"))
        .stdout(predicate::str::contains("cli-secret").not());
}

#[test]
fn config_get_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), 8080);

    let output = sisense(dir.path())
        .args(["-O", "json", "config", "get", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let profile: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(profile["domain"], "127.0.0.1");
    assert_eq!(profile["token"], "********");
    assert_eq!(profile["is_ssl"], false);
    assert_eq!(profile["timeout"], "5s");
}

#[test]
fn environment_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), 8080);

    sisense(dir.path())
        .args(["config", "get"])
        .env("SISENSE_DOMAIN", "bi.example.com")
        .env("SISENSE_IS_SSL", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://bi.example.com:8080"));
}

#[test]
fn missing_domain_fails() {
    let dir = tempfile::tempdir().unwrap();

    sisense(dir.path())
        .args(["config", "get"])
        .env("SISENSE_TOKEN", "t")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No domain found"));
}
