//! Certificate orchestrators: create, new-version, and list.
//!
//! Each command is strictly serialized: build the request, gate on
//! existence, confirm with the operator, then submit.  The existence
//! check and the create call each get their own `--timeout` deadline;
//! the list walk runs under a single one.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::{error, info};

use crate::cli;
use crate::cli::KvCommand;
use crate::config;
use crate::credentials;
use crate::error::{Error, Result};
use crate::logging;
use crate::merge::{apply_overrides, parse_tags, FlagOverrides};
use crate::preflight;
use crate::vault::{
    CertificateCreateParameters,
    KeyVaultClient,
    VaultOps,
};

pub fn dispatch(c: &KvCommand, cmd: &cli::certificate::Command)
                -> Result<()>
{
    let config_path = config::expand_home(&c.config_path)?;
    let cfg = config::load(&config_path)?;

    logging::init(cfg.lumberjacklogger.as_ref())?;
    logging::log_on_panic();

    let vault_name = resolve_vault_name(c, &cfg)?;
    let vault_url = crate::vault::vault_url(&vault_name);

    match &cmd.subcommand {
        cli::certificate::Subcommands::Create(create_cmd) => {
            // Flag problems should surface before any network traffic.
            let overrides = FlagOverrides {
                subject: create_cmd.subject.clone().unwrap_or_default(),
                sans: create_cmd.san.clone(),
                tags: parse_tags(&create_cmd.tag)?,
                validity_in_months: create_cmd.validity.unwrap_or(0),
                enabled: create_cmd.enabled,
                issuer_name: create_cmd.issuer_name.clone()
                    .unwrap_or_default(),
            };
            let client = connect(&vault_name, c)?;
            create(&client, &vault_url, c.timeout,
                   &cfg.certificate_create_parameters,
                   &create_cmd.name, &overrides,
                   create_cmd.new_version_ok,
                   create_cmd.skip_confirmation,
                   &mut io::stdin().lock(), &mut io::stdout().lock())
        }
        cli::certificate::Subcommands::NewVersion(nv_cmd) => {
            let client = connect(&vault_name, c)?;
            new_version(&client, &vault_url, c.timeout, &nv_cmd.name,
                        nv_cmd.skip_confirmation,
                        &mut io::stdin().lock(), &mut io::stdout().lock())
        }
        cli::certificate::Subcommands::List(_) => {
            let client = connect(&vault_name, c)?;
            list(&client, &vault_url, c.timeout,
                 &mut io::stdout().lock())
        }
    }
}

/// Flag beats config; an empty result is an operator error.
fn resolve_vault_name(c: &KvCommand, cfg: &config::Config)
                      -> Result<String>
{
    let name = match c.vault_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => cfg.vault_name.as_str(),
    };
    if name.is_empty() {
        return Err(Error::FlagParse(
            "vault name is empty; set vault_name in the config \
             or pass --vault-name".into()));
    }
    Ok(name.to_string())
}

/// Builds the authenticated client and runs the reachability preflight.
fn connect(vault_name: &str, c: &KvCommand) -> Result<KeyVaultClient> {
    let credential = credentials::from_az_cli().map_err(|e| {
        error!(err = %e, "key vault authorization error");
        e
    })?;
    let client = KeyVaultClient::new(credential, c.unsafe_log_auth)?;
    preflight::check_vault_reachable(vault_name, c.timeout)?;
    Ok(client)
}

/// The create pipeline: build, existence gate, confirmation, submit.
#[allow(clippy::too_many_arguments)]
fn create(client: &dyn VaultOps, vault_url: &str, timeout: Duration,
          template: &config::CertificateTemplate, name: &str,
          overrides: &FlagOverrides, new_version_ok: bool,
          skip_confirmation: bool,
          input: &mut dyn BufRead, output: &mut dyn Write)
          -> Result<()>
{
    let mut params = CertificateCreateParameters::from(template);
    apply_overrides(&mut params, overrides);

    // The check is advisory: someone else may create this name between
    // the check and our create call.
    if !new_version_ok
        && client.get_certificate(vault_url, name, "", timeout).is_ok()
    {
        error!(name,
               "certificate already exists; \
                pass --new-version-ok to create a new version");
        return Err(Error::AlreadyExists { name: name.to_string() });
    }

    if !skip_confirmation {
        confirm_creation(vault_url, &params, input, output)?;
    }

    submit(client, vault_url, timeout, name, &params,
           "certificate created")
}

/// Fetches an existing certificate and resubmits its policy,
/// attributes, and tags as a new version.  No flag overrides apply.
fn new_version(client: &dyn VaultOps, vault_url: &str, timeout: Duration,
               name: &str, skip_confirmation: bool,
               input: &mut dyn BufRead, output: &mut dyn Write)
               -> Result<()>
{
    let bundle = client.get_certificate(vault_url, name, "", timeout)
        .map_err(|e| {
            error!(vault_url, name, err = %e, "can't get certificate");
            e
        })?;

    let params = CertificateCreateParameters {
        policy: bundle.policy.unwrap_or_default(),
        attributes: bundle.attributes.unwrap_or_default(),
        tags: bundle.tags.unwrap_or_default(),
    };

    if !skip_confirmation {
        confirm_creation(vault_url, &params, input, output)?;
    }

    submit(client, vault_url, timeout, name, &params,
           "certificate created (new version)")
}

/// Streams every certificate in the vault as an indented JSON block.
fn list(client: &dyn VaultOps, vault_url: &str, timeout: Duration,
        output: &mut dyn Write)
        -> Result<()>
{
    let certs = client.list_certificates(vault_url, timeout)?;
    for cert in certs {
        let cert = cert.map_err(|e| {
            error!(err = %e, "can't advance certificate list");
            e
        })?;
        let rendered = serde_json::to_string_pretty(&cert)?;
        writeln!(output, "{}", rendered)
            .map_err(|e| Error::io("can't write certificate list", e))?;
    }
    Ok(())
}

/// Renders the resolved request and requires a literal `yes`.
fn confirm_creation(vault_url: &str,
                    params: &CertificateCreateParameters,
                    input: &mut dyn BufRead, output: &mut dyn Write)
                    -> Result<()>
{
    let rendered = serde_json::to_string_pretty(params)?;
    let write_err =
        |e| Error::io("can't write confirmation prompt", e);

    writeln!(output,
             "A certificate will be created in keyvault '{}' \
              with the following parameters:",
             vault_url).map_err(write_err)?;
    writeln!(output, "{}", rendered).map_err(write_err)?;
    write!(output, "Type 'yes' to continue: ").map_err(write_err)?;
    output.flush().map_err(write_err)?;

    let mut line = String::new();
    input.read_line(&mut line)
        .map_err(|e| Error::io("can't read confirmation input", e))?;
    let confirmation = line.trim();
    if confirmation != "yes" {
        error!(confirmation, "confirmation went bad");
        return Err(Error::UserRefused(confirmation.to_string()));
    }
    Ok(())
}

fn submit(client: &dyn VaultOps, vault_url: &str, timeout: Duration,
          name: &str, params: &CertificateCreateParameters,
          success_message: &str)
          -> Result<()>
{
    let receipt = client
        .create_certificate(vault_url, name, params, timeout)
        .map_err(|e| {
            error!(name, err = %e, "certificate creation error");
            e
        })?;

    info!(name,
          created_id = receipt.id.as_deref().unwrap_or(""),
          request_id = receipt.request_id.as_deref().unwrap_or(""),
          status = receipt.status.as_deref().unwrap_or(""),
          status_details = receipt.status_details.as_deref().unwrap_or(""),
          "{}", success_message);
    Ok(())
}
