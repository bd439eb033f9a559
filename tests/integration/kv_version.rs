use predicates::prelude::*;

use crate::integration::common::Kv;

#[test]
fn version_prints_package_version_and_build_info() {
    let kv = Kv::new();
    kv.command()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            format!("kvassist {}", env!("CARGO_PKG_VERSION"))))
        .stdout(predicate::str::contains("commit: "))
        .stdout(predicate::str::contains("date: "))
        .stdout(predicate::str::contains("built-by: "));
}

#[test]
fn version_needs_no_config() {
    // The config path points into an empty directory; version must not
    // care.
    let kv = Kv::new();
    kv.command().arg("version").assert().success();
}

#[test]
fn no_subcommand_shows_help() {
    let kv = Kv::new();
    kv.command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn bogus_timeout_is_a_usage_error() {
    let kv = Kv::new();
    kv.command()
        .args(["--timeout", "bogus", "certificate", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}
