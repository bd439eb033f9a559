//! `kvassist` is a lean companion to `az keyvault`: it creates
//! certificates and certificate versions from a reviewed YAML template
//! instead of a pile of one-off flags.

use clap::Parser;

mod cli;
mod commands;
mod config;
mod credentials;
mod error;
mod logging;
mod merge;
mod preflight;
mod vault;

use error::Error;

fn main() {
    let c = cli::KvCommand::parse();
    if let Err(err) = commands::dispatch(c) {
        print_error_chain(&err);
        std::process::exit(1);
    }
}

/// Returns the error chain as a vec of strings.
///
/// The error chain is deduplicated: consecutive duplicate messages are
/// removed, which helps where an error was wrapped without adding
/// anything.
fn error_chain(err: &Error) -> Vec<String> {
    let mut errs = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        errs.push(cause.to_string());
        source = cause.source();
    }
    errs.dedup();
    errs
}

/// Prints the error and causes, if any.
fn print_error_chain(err: &Error) {
    let chain = error_chain(err);
    let mut chain = chain.iter();
    if let Some(err) = chain.next() {
        eprintln!("           {}", err);
    }
    chain.for_each(|cause| eprintln!("  because: {}", cause));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_includes_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "inner");
        let err = Error::io("outer", io);
        let chain = error_chain(&err);
        assert_eq!(chain.len(), 2);
        assert!(chain[0].contains("outer"));
        assert_eq!(chain[1], "inner");
    }

    #[test]
    fn chain_dedups_repeated_messages() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "same");
        let err = Error::io("same", io);
        assert_eq!(error_chain(&err), ["same"]);
    }
}
