use std::fs;

use httpmock::prelude::*;
use predicates::prelude::*;

use crate::integration::common::{Kv, TEST_CONFIG};

#[test]
fn edit_creates_default_config_on_first_run() {
    let kv = Kv::new();
    // `true` ignores the file argument and exits 0, standing in for an
    // editor the operator closes immediately.
    kv.command()
        .args(["config", "edit", "--editor", "true"])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote default config"));

    let written = fs::read_to_string(kv.config_path()).unwrap();
    assert!(written.contains("vault_name: my-key-vault"));
    assert!(written.contains("certificate_create_parameters:"));
}

#[test]
fn edit_is_idempotent_for_an_existing_config() {
    let kv = Kv::new();
    kv.write_config(TEST_CONFIG);

    kv.command()
        .args(["config", "edit", "--editor", "true"])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote default config").not());

    assert_eq!(fs::read_to_string(kv.config_path()).unwrap(), TEST_CONFIG);
}

#[test]
fn edit_reports_a_broken_editor() {
    let kv = Kv::new();
    kv.command()
        .args(["config", "edit", "--editor", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("editor exited with"));
}

#[test]
fn download_fetches_a_shared_config() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/team/kvassist.yaml");
        then.status(200).body(TEST_CONFIG);
    });

    let kv = Kv::new();
    kv.command()
        .args(["config", "download",
               "--url", &server.url("/team/kvassist.yaml")])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote config to"));

    assert_eq!(fs::read_to_string(kv.config_path()).unwrap(), TEST_CONFIG);
}

#[test]
fn download_refuses_to_overwrite() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/team/kvassist.yaml");
        then.status(200).body(TEST_CONFIG);
    });

    let kv = Kv::new();
    kv.write_config("vault_name: mine\n");

    kv.command()
        .args(["config", "download",
               "--url", &server.url("/team/kvassist.yaml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));

    assert_eq!(fs::read_to_string(kv.config_path()).unwrap(),
               "vault_name: mine\n");
}

#[test]
fn failed_download_leaves_nothing_behind() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/team/kvassist.yaml");
        then.status(404).body("gone");
    });

    let kv = Kv::new();
    kv.command()
        .args(["config", "download",
               "--url", &server.url("/team/kvassist.yaml")])
        .assert()
        .failure();
    assert!(!kv.config_path().exists());
}
