//! Command-line parser for `kvassist config`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    name = "config",
    about = "Manage the config file",
    subcommand_required = true,
    arg_required_else_help = true,
)]
pub struct Command {
    #[clap(subcommand)]
    pub subcommand: Subcommands,
}

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    Edit(EditCommand),
    Download(DownloadCommand),
}

#[derive(Parser, Debug)]
#[clap(
    name = "edit",
    about = "Edit or create the config file",
    long_about = "Edit or create the config file

If the config file does not exist yet, the embedded default is written \
to it first.  An existing file is opened as-is.  `$EDITOR` is the \
fallback when `--editor` is not given, then a platform default.
",
)]
pub struct EditCommand {
    #[clap(
        short = 'e',
        long = "editor",
        value_name = "PATH",
        help = "Editor to open the config with; `$EDITOR` is the fallback",
    )]
    pub editor: Option<String>,
}

#[derive(Parser, Debug)]
#[clap(
    name = "download",
    about = "Download a shared config file",
    long_about = "Download a shared config file

Fetches the URL and writes the body to the config path.  An existing \
config file is never overwritten.
",
)]
pub struct DownloadCommand {
    #[clap(
        long = "url",
        value_name = "URL",
        help = "Where to fetch the config from",
    )]
    pub url: String,
}
