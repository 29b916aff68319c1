//! Tracing setup for the command-line front end.
//!
//! Log lines go to stderr so they never mix with prompts and results on
//! stdout. The GUI installs its own file-backed subscriber instead.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber at WARN
///
/// Skipped history rows still surface; routine debug/info chatter stays
/// hidden unless RUST_LOG asks for it.
pub fn init() {
    init_with_level("warn")
}

/// Install the stderr subscriber with `default_level` as the filter when
/// RUST_LOG is unset
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Route logs into the test harness output at DEBUG
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
