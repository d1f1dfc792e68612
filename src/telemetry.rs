//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "SWEEPSTAT_LOG";

static INIT: Once = Once::new();

/// Install a global `fmt` subscriber.
///
/// Reads [`LOG_ENV`] (e.g. `SWEEPSTAT_LOG=sweepstat=debug`) and falls back to
/// `sweepstat=info` when it is unset or invalid. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("sweepstat=info"));

        // Another subscriber may already be installed by the host application
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
    });
}
