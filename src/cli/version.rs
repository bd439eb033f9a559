//! Command-line parser for `kvassist version`.

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "version",
    about = "Print version and build information",
)]
pub struct Command {}
