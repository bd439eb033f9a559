//! Certificate command failures that surface before any vault traffic.
//!
//! The happy paths need a vault (or a mocked one) and are covered by the
//! unit tests against the vault trait; here we pin down the config and
//! flag validation the binary does up front.

use predicates::prelude::*;

use crate::integration::common::{Kv, TEST_CONFIG};

#[test]
fn missing_config_points_at_config_edit() {
    let kv = Kv::new();
    kv.command()
        .args(["certificate", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no config found"))
        .stderr(predicate::str::contains("kvassist config edit"));
}

#[test]
fn unparseable_config_is_fatal() {
    let kv = Kv::new();
    kv.write_config("version: \"0.0.1\"\nnot_a_key: true\n");
    kv.command()
        .args(["certificate", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("can't parse config"));
}

#[test]
fn malformed_tag_fails_before_any_network_access() {
    let kv = Kv::new();
    kv.write_config(TEST_CONFIG);
    kv.command()
        .args(["certificate", "create", "--name", "c1", "-t", "badtag"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "tags should be formatted key=value: badtag"));
}

#[test]
fn empty_vault_name_is_rejected() {
    let kv = Kv::new();
    kv.write_config(&TEST_CONFIG.replace("vault_name: kv-test",
                                         "vault_name: \"\""));
    kv.command()
        .args(["certificate", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("vault name is empty"));
}

#[test]
fn create_requires_a_name() {
    let kv = Kv::new();
    kv.write_config(TEST_CONFIG);
    kv.command()
        .args(["certificate", "create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}
