//! Reachability preflight.
//!
//! Opens and immediately closes a TLS connection to the vault FQDN so
//! DNS, routing, and handshake problems surface as one well-localized
//! error instead of somewhere inside the HTTP client.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

/// Dials `<vault-name>.vault.azure.net:443`, completes a TLS handshake,
/// and drops the connection.
pub fn check_vault_reachable(vault_name: &str, timeout: Duration)
                             -> Result<()>
{
    reachable(&format!("{}.vault.azure.net", vault_name), timeout)
}

fn reachable(host: &str, timeout: Duration) -> Result<()> {
    let preflight = || -> std::result::Result<
        (), Box<dyn std::error::Error + Send + Sync>>
    {
        let addr = (host, 443)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| format!("no addresses for {}", host))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        let connector = native_tls::TlsConnector::new()?;
        let tls = connector.connect(host, stream)?;
        drop(tls);
        Ok(())
    };

    preflight().map_err(|source| Error::NetworkPreflight {
        host: host.to_string(),
        source,
    })?;

    debug!(host, "vault preflight dial succeeded");
    Ok(())
}
