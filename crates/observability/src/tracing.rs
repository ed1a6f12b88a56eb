//! Tracing/logging initialization.
//!
//! JSON events with an env-driven filter. The order pipeline emits plain
//! events (no spans yet), so span configuration stays at the defaults.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON logs, RUST_LOG-configurable; targets kept so events are
    // attributable to their emitting crate.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .try_init();
}
