//! Log output for the binary. Logs go to stderr; stdout carries rendered pages.
//!
//! Filter priority: `COURSEDECK_LOG`, then `RUST_LOG`, then the `-v`/`-q` flags.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "COURSEDECK_LOG";

pub fn level_for(verbose: u8, quiet: bool) -> Level {
    match (verbose, quiet) {
        (0, true) => Level::ERROR,
        (0, false) => Level::WARN,
        (1, _) => Level::INFO,
        _ => Level::DEBUG,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(level.as_str())
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(verbose: u8, quiet: bool, no_color: bool) {
    let filter = build_env_filter(level_for(verbose, quiet));
    let use_ansi = !no_color && std::io::IsTerminal::is_terminal(&std::io::stderr());
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(verbose > 1)
        .without_time()
        .compact();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
