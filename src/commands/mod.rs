//! Subcommand dispatchers.

use crate::cli::{KvCommand, KvSubcommands};
use crate::error::Result;

pub mod certificate;
pub mod config;
pub mod version;

/// Dispatches the top-level subcommand.
pub fn dispatch(c: KvCommand) -> Result<()> {
    match &c.subcommand {
        KvSubcommands::Certificate(cmd) => certificate::dispatch(&c, cmd),
        KvSubcommands::Config(cmd) => config::dispatch(&c, cmd),
        KvSubcommands::Version(_) => version::dispatch(),
    }
}
