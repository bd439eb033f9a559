//! Access tokens from the ambient `az` login session.
//!
//! The vault SDKs obtain CLI credentials by shelling out to `az`; we do
//! the same.  No secrets are cached or persisted by this tool.

use std::io;
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The resource the token must be scoped to.
pub const RESOURCE: &str = "https://vault.azure.net";

/// Token envelope printed by `az account get-access-token`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_on: Option<String>,
    pub token_type: Option<String>,
}

/// Asks the `az` CLI for a vault-scoped access token.
pub fn from_az_cli() -> Result<AccessToken> {
    let output = Command::new("az")
        .args(["account", "get-access-token",
               "--resource", RESOURCE,
               "--output", "json"])
        .output()
        .map_err(|e| Error::Auth(Box::new(e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr)
            .trim()
            .to_string();
        return Err(Error::Auth(Box::new(io::Error::new(
            io::ErrorKind::Other,
            format!("az exited with {}: {}", output.status, stderr),
        ))));
    }

    let token: AccessToken = serde_json::from_slice(&output.stdout)
        .map_err(|e| Error::Auth(Box::new(e)))?;
    if token.access_token.is_empty() {
        return Err(Error::Auth(Box::new(io::Error::new(
            io::ErrorKind::InvalidData,
            "az returned an empty access token",
        ))));
    }
    Ok(token)
}
