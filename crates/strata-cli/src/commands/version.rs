//! `strata version` command implementation.

use miette::Result;
use serde::Serialize;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct VersionJson {
    version: &'static str,
}

/// Run the version command.
pub fn run(json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&VersionJson { version: VERSION }).unwrap_or_default()
        );
    } else {
        println!("strata {VERSION}");
    }
    Ok(())
}
