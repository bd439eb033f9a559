//! Defines the command-line interface.
//!
//! This module contains kvassist's clap definitions and nothing else;
//! the dispatchers live in `crate::commands`.

use std::time::Duration;

use clap::{Parser, Subcommand};

pub mod certificate;
pub mod config;
pub mod version;

pub const GLOBAL_OPTIONS_HEADER: &str = "Global Options";

/// Default config file location, home-expanded at runtime.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/kvassist.yaml";

/// Defines the CLI.
#[derive(Parser, Debug)]
#[clap(
    name = "kvassist",
    about = "Lean on this when `az keyvault` isn't quite as useful as needed",
    long_about = "Lean on this when `az keyvault` isn't quite as useful as needed

kvassist fills one gap in the vault's own CLI: creating certificates \
(and new versions of existing certificates) with the full \
create-certificate parameter surface.  Defaults come from a YAML config \
file, individual fields can be overridden per invocation, and the fully \
resolved request is shown for confirmation before anything is sent.

Credentials come from the ambient `az login` session.
",
    subcommand_required = true,
    arg_required_else_help = true,
    disable_colored_help = true,
)]
pub struct KvCommand {
    #[clap(
        short = 'c',
        long = "config-path",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH,
        global = true,
        help_heading = GLOBAL_OPTIONS_HEADER,
        help = "Set the config file path",
        long_help = "\
Set the config file path.  A leading `~` is expanded to the home \
directory.  Run `kvassist config edit` to create the file from the \
embedded default.",
    )]
    pub config_path: String,

    #[clap(
        short = 'v',
        long = "vault-name",
        value_name = "NAME",
        global = true,
        help_heading = GLOBAL_OPTIONS_HEADER,
        help = "Key vault name; overrides `vault_name` from the config",
    )]
    pub vault_name: Option<String>,

    #[clap(
        long = "timeout",
        value_name = "DURATION",
        default_value = "30s",
        global = true,
        value_parser = humantime::parse_duration,
        help_heading = GLOBAL_OPTIONS_HEADER,
        help = "Bound each vault operation by this deadline, e.g. `30s` or `1m`",
        long_help = "\
Bound each vault operation by this deadline, e.g. `30s` or `1m`.

The existence check and the create call each get an independent \
deadline of this size, so `certificate create` may take up to twice \
the value in the worst case.",
    )]
    pub timeout: Duration,

    #[clap(
        long = "unsafe-log-auth",
        global = true,
        help_heading = GLOBAL_OPTIONS_HEADER,
        help = "Include Authorization headers verbatim in DEBUG HTTP dumps",
        long_help = "\
Include Authorization headers verbatim in DEBUG HTTP dumps.

By default the bearer token is redacted from the request dumps that \
are written to the log.  Pass this to log the raw header instead, \
e.g. when debugging authentication problems.  The token then ends up \
in the log file.",
    )]
    pub unsafe_log_auth: bool,

    #[clap(subcommand)]
    pub subcommand: KvSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum KvSubcommands {
    Certificate(certificate::Command),
    Config(config::Command),
    Version(version::Command),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        KvCommand::command().debug_assert();
    }

    #[test]
    fn create_parses_repeated_flags() {
        let c = KvCommand::try_parse_from([
            "kvassist", "certificate", "create",
            "--name", "c1",
            "--san", "a.foo.com", "--san", "b.foo.com",
            "-t", "env=prod", "-t", "team=infra",
            "--validity", "12",
            "--enabled",
            "--issuer-name", "MyCA",
            "--new-version-ok",
            "--skip-confirmation",
        ]).unwrap();

        let KvSubcommands::Certificate(cmd) = c.subcommand else {
            panic!("expected certificate subcommand");
        };
        let certificate::Subcommands::Create(create) = cmd.subcommand else {
            panic!("expected create subcommand");
        };
        assert_eq!(create.name, "c1");
        assert_eq!(create.san, ["a.foo.com", "b.foo.com"]);
        assert_eq!(create.tag, ["env=prod", "team=infra"]);
        assert_eq!(create.validity, Some(12));
        assert!(create.enabled);
        assert_eq!(create.issuer_name.as_deref(), Some("MyCA"));
        assert!(create.new_version_ok);
        assert!(create.skip_confirmation);
    }

    #[test]
    fn create_requires_a_name() {
        assert!(KvCommand::try_parse_from(
            ["kvassist", "certificate", "create"]).is_err());
    }

    #[test]
    fn timeout_parses_human_durations() {
        let c = KvCommand::try_parse_from(
            ["kvassist", "--timeout", "1m", "certificate", "list"]).unwrap();
        assert_eq!(c.timeout, Duration::from_secs(60));

        assert!(KvCommand::try_parse_from(
            ["kvassist", "--timeout", "bogus", "certificate", "list"])
            .is_err());
    }

    #[test]
    fn globals_may_follow_the_subcommand() {
        let c = KvCommand::try_parse_from([
            "kvassist", "certificate", "list", "-v", "kv1", "-c", "/tmp/c.yaml",
        ]).unwrap();
        assert_eq!(c.vault_name.as_deref(), Some("kv1"));
        assert_eq!(c.config_path, "/tmp/c.yaml");
    }
}
