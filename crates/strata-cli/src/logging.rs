//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate so library crates stay lightweight.
//! Uses tracing with optional structured JSON output on stderr.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `verbosity` maps 0/1/2+ to INFO/DEBUG/TRACE. The `RUST_LOG` env var is
/// respected, with the verbosity flag layered on top. With `json` set,
/// stable JSON lines go to stderr for machine parsing.
///
/// # Panics
/// Panics if the subscriber cannot be initialized (e.g., called twice).
pub fn init(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("strata={level}").parse().unwrap())
        .add_directive(level.into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
