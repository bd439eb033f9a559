//! Configuration model and file parsing.
//!
//! The configuration file is YAML and is parsed strictly: unknown keys at
//! any level are fatal.  It is the sole source of defaults for the
//! certificate template; nothing is baked into code.  The embedded
//! [`DEFAULT_CONFIG`] is what `kvassist config edit` writes on first run.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The default configuration, materialized by `config edit` when no
/// config file exists yet.
pub const DEFAULT_CONFIG: &str = "\
# kvassist configuration
version: \"0.0.1\"

# Optional log sink.  Events are appended as line-delimited JSON.  The
# file is rotated when it exceeds maxsize (MB); up to maxbackups rotated
# files are kept, and backups older than maxage days are pruned.  Remove
# this block to log to stderr only.
lumberjacklogger:
  filename: ~/.config/kvassist.jsonl.log
  maxsize: 5
  maxbackups: 3
  maxage: 30

# Default key vault.  `--vault-name` overrides this.
vault_name: my-key-vault

# Template for `kvassist certificate create`.  Flags override individual
# fields per invocation.
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

/// The parsed configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: String,

    /// Log sink spec.  The field name matches the Go tool this config
    /// format is shared with, where the sink was a lumberjack logger.
    #[serde(default)]
    pub lumberjacklogger: Option<LogSink>,

    pub vault_name: String,

    pub certificate_create_parameters: CertificateTemplate,
}

/// Rolling-file log sink spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSink {
    pub filename: String,

    /// Rotation threshold in megabytes.
    #[serde(default = "default_maxsize")]
    pub maxsize: u64,

    /// Rotated files to keep.  Zero keeps all of them.
    #[serde(default)]
    pub maxbackups: u32,

    /// Days to keep rotated files.  Zero keeps them forever.
    #[serde(default)]
    pub maxage: u64,
}

fn default_maxsize() -> u64 {
    100
}

/// Declarative template for a certificate-create request.
///
/// Field names and nesting mirror the YAML config document; the wire
/// shape sent to the vault lives in [`crate::vault`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateTemplate {
    pub certificate_attributes: CertificateAttributes,
    pub certificate_policy: CertificatePolicy,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateAttributes {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificatePolicy {
    pub key_properties: KeyProperties,
    pub secret_properties: SecretProperties,
    pub x509_certificate_properties: X509CertificateProperties,
    #[serde(default)]
    pub lifetime_actions: Vec<LifetimeAction>,
    pub issuer_parameters: IssuerParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyProperties {
    pub exportable: bool,
    pub key_type: String,
    pub key_size: i32,
    pub reuse_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretProperties {
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct X509CertificateProperties {
    pub subject: String,
    #[serde(default)]
    pub subject_alternative_names: Vec<String>,
    pub validity_in_months: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifetimeAction {
    pub trigger: Trigger,
    pub action: String,
}

/// Exactly one of the two trigger fields should be set; the vault
/// rejects the request otherwise, and we leave that validation to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    #[serde(default)]
    pub lifetime_percentage: Option<i32>,
    #[serde(default)]
    pub days_before_expiry: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuerParameters {
    pub name: String,
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            Error::io(
                format!("can't expand {}", path),
                io::Error::new(io::ErrorKind::NotFound,
                               "no home directory"),
            )
        })?;
        if path == "~" {
            Ok(home)
        } else {
            Ok(home.join(&path[2..]))
        }
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Reads and strictly parses the config file at `path`.
///
/// The log sink's filename is home-expanded; nothing else is rewritten.
/// A missing file is reported as [`Error::ConfigMissing`], which points
/// the operator at `config edit`.
pub fn load(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::ConfigMissing { path: path.to_path_buf() }
        } else {
            Error::io(format!("can't read config {}", path.display()), e)
        }
    })?;

    let mut cfg: Config = serde_yaml::from_str(&text)
        .map_err(|source| Error::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(sink) = cfg.lumberjacklogger.as_mut() {
        sink.filename = expand_home(&sink.filename)?
            .display()
            .to_string();
    }

    Ok(cfg)
}
