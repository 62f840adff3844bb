use std::env::consts::{ARCH, OS};
use std::process::Command;

fn main() -> anyhow::Result<()> {
    // Build a version string to use in the user-agent and `--version` flag for the CLI.
    #[cfg(debug_assertions)]
    const BUILD_TYPE: &str = "debug";
    #[cfg(not(debug_assertions))]
    const BUILD_TYPE: &str = "release";

    let revision = match get_commit_hash() {
        Some(hash) if is_working_tree_clean() => hash,
        Some(hash) => format!("{hash}+"),
        None => "unknown".to_string(),
    };

    let version_string = format!(
        "{} ({}, {}, {}/{})",
        env!("CARGO_PKG_VERSION"),
        revision,
        BUILD_TYPE,
        OS,
        ARCH
    );

    println!("cargo:rustc-env=SISENSE_VERSION={}", version_string);
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

// Source tarballs have no git metadata, so every git call is optional.
fn get_commit_hash() -> Option<String> {
    let output = Command::new("git")
        .arg("log")
        .arg("-1")
        .arg("--pretty=format:%h") // Abbreviated commit hash
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .ok()?;

    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !hash.is_empty()).then_some(hash)
}

fn is_working_tree_clean() -> bool {
    Command::new("git")
        .arg("diff")
        .arg("--quiet")
        .arg("--exit-code")
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .status()
        .is_ok_and(|status| status.success())
}
