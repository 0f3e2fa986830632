//! Captures the compiling `rustc` version and the locked `axum` version for
//! the info page.

use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    println!("cargo:rustc-env=DUO_RUSTC_VERSION={}", rustc_version());
    println!("cargo:rerun-if-env-changed=RUSTC");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_owned());
    let lockfile = PathBuf::from(manifest_dir).join("../../Cargo.lock");
    println!("cargo:rustc-env=DUO_AXUM_VERSION={}", locked_version(&lockfile, "axum"));
    println!("cargo:rerun-if-changed={}", lockfile.display());
}

fn rustc_version() -> String {
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_owned());
    Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        // "rustc 1.85.0 (4d91de4e4 2025-02-17)" -> "1.85.0"
        .and_then(|line| line.split_whitespace().nth(1).map(str::to_owned))
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Version of `name` resolved in the workspace lockfile, `"unknown"` when
/// the lockfile is missing or does not list the package.
fn locked_version(lockfile: &Path, name: &str) -> String {
    std::fs::read_to_string(lockfile)
        .ok()
        .and_then(|text| text.parse::<toml::Table>().ok())
        .and_then(|lock| {
            lock.get("package")?
                .as_array()?
                .iter()
                .filter(|pkg| pkg.get("name").and_then(|n| n.as_str()) == Some(name))
                .find_map(|pkg| pkg.get("version")?.as_str().map(str::to_owned))
        })
        .unwrap_or_else(|| "unknown".to_owned())
}
