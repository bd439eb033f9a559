//! Command-line parser for `kvassist certificate`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    name = "certificate",
    about = "Work with certificates",
    subcommand_required = true,
    arg_required_else_help = true,
)]
pub struct Command {
    #[clap(subcommand)]
    pub subcommand: Subcommands,
}

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    Create(CreateCommand),
    List(ListCommand),
    NewVersion(NewVersionCommand),
}

#[derive(Parser, Debug)]
#[clap(
    name = "create",
    about = "Create a certificate",
    long_about = "Create a certificate

The request is built from the config template, with any of the flags \
below overriding individual fields.  Unless `--skip-confirmation` is \
passed, the fully resolved request is printed and must be confirmed \
with a literal `yes`.

Unless `--new-version-ok` is passed, creation is refused if a \
certificate with the given name already exists.  Note the check is \
advisory: someone else may create the name between the check and the \
create call.
",
)]
pub struct CreateCommand {
    #[clap(
        short = 'n',
        long = "name",
        value_name = "NAME",
        help = "Certificate name in the vault",
    )]
    pub name: String,

    #[clap(
        long = "subject",
        value_name = "DN",
        help = "Certificate subject, e.g. `CN=example.com`",
    )]
    pub subject: Option<String>,

    #[clap(
        long = "san",
        value_name = "DNS-NAME",
        help = "Subject alternative DNS name; repeatable",
        long_help = "\
Subject alternative DNS name; repeatable.  When given, the full list \
replaces the config template's list.",
    )]
    pub san: Vec<String>,

    #[clap(
        short = 't',
        long = "tag",
        value_name = "KEY=VALUE",
        help = "Tag to attach; repeatable",
        long_help = "\
Tag to attach; repeatable.  When given, the flag tags replace the \
config template's tags entirely; they are not merged.",
    )]
    pub tag: Vec<String>,

    #[clap(
        long = "validity",
        value_name = "MONTHS",
        help = "Validity in months",
    )]
    pub validity: Option<i32>,

    #[clap(
        short = 'e',
        long = "enabled",
        help = "Enable the certificate on creation",
        long_help = "\
Enable the certificate on creation.  Omitting the flag inherits the \
config value; there is no flag to explicitly disable, so a disabled \
certificate can only come from the config.",
    )]
    pub enabled: bool,

    #[clap(
        long = "issuer-name",
        value_name = "NAME",
        help = "Issuer, e.g. `Self` or a configured CA name",
    )]
    pub issuer_name: Option<String>,

    #[clap(
        long = "new-version-ok",
        help = "Allow creating a new version of an existing certificate",
    )]
    pub new_version_ok: bool,

    #[clap(
        long = "skip-confirmation",
        help = "Create without prompting for confirmation",
    )]
    pub skip_confirmation: bool,
}

#[derive(Parser, Debug)]
#[clap(
    name = "list",
    about = "List certificates in the vault as indented JSON",
)]
pub struct ListCommand {}

#[derive(Parser, Debug)]
#[clap(
    name = "new-version",
    about = "Create a new version of an existing certificate",
    long_about = "Create a new version of an existing certificate

The current policy, attributes, and tags are fetched and reused \
verbatim; no override flags apply here.
",
)]
pub struct NewVersionCommand {
    #[clap(
        short = 'n',
        long = "name",
        value_name = "NAME",
        help = "Certificate name in the vault",
    )]
    pub name: String,

    #[clap(
        long = "skip-confirmation",
        help = "Create without prompting for confirmation",
    )]
    pub skip_confirmation: bool,
}
