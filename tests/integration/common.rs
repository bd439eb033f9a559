#![allow(unused)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A config with no log sink, so tests never write outside their
/// temporary directory.
pub const TEST_CONFIG: &str = "\
version: \"0.0.1\"
vault_name: kv-test
certificate_create_parameters:
  certificate_attributes:
    enabled: false
  certificate_policy:
    key_properties:
      exportable: true
      key_type: RSA
      key_size: 2048
      reuse_key: false
    secret_properties:
      content_type: application/x-pkcs12
    x509_certificate_properties:
      subject: CN=example.com
      subject_alternative_names:
        - example.com
      validity_in_months: 12
    lifetime_actions:
      - trigger:
          lifetime_percentage: 80
        action: AutoRenew
    issuer_parameters:
      name: Self
  tags:
    team: my-team
";

/// An isolated invocation context: every command points at a config
/// path inside a fresh temporary directory.
pub struct Kv {
    home: TempDir,
}

impl Kv {
    pub fn new() -> Self {
        Kv { home: TempDir::new().expect("can create a temporary directory") }
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("kvassist.yaml")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content)
            .expect("can write test config");
    }

    /// Returns a command with the config path already set.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("kvassist")
            .expect("binary is built");
        cmd.arg("--config-path")
            .arg(self.config_path());
        cmd
    }
}
