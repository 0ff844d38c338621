//! Process-wide `tracing` subscriber setup. Both entry points are idempotent:
//! a second call (the binary and `server::run` both initialise) is a no-op.

use std::io;

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset: request traces on, SQL chatter off.
pub const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info,sea_orm=warn,sqlx=warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Human-readable compact lines on stdout.
pub fn init_logging_default() {
    let _ = fmt().with_env_filter(filter()).with_target(false).compact().with_writer(io::stdout).try_init();
}

/// One JSON object per event on stdout, for log shippers (`LOG_FORMAT=json`).
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(filter())
        .with_target(false)
        .json()
        .with_current_span(true)
        .with_writer(io::stdout)
        .try_init();
}
