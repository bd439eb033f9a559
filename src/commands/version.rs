//! Version and build information.

use crate::error::Result;

// Overridden by the release pipeline via environment variables at
// build time.
const COMMIT: Option<&str> = option_env!("KVASSIST_BUILD_COMMIT");
const DATE: Option<&str> = option_env!("KVASSIST_BUILD_DATE");
const BUILT_BY: Option<&str> = option_env!("KVASSIST_BUILT_BY");

pub fn dispatch() -> Result<()> {
    println!("kvassist {}", env!("CARGO_PKG_VERSION"));
    println!("commit: {}", COMMIT.unwrap_or("unknown"));
    println!("date: {}", DATE.unwrap_or("unknown"));
    println!("built-by: {}", BUILT_BY.unwrap_or("source build"));
    Ok(())
}
