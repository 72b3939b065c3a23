//! Tracing subscriber setup

use crate::constants::{DEFAULT_LOG_FILTER, TOLLGATE_LOG_VAR};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing system
///
/// The filter comes from `TOLLGATE_LOG`, then `RUST_LOG`, then falls back to
/// `info`. Output is a compact, non-ANSI stderr formatter. Fails if a global
/// subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_level(true),
        )
        .try_init()?;
    Ok(())
}

/// Initialize tracing for tests, ignoring an already-installed subscriber
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_test_writer().compact())
        .try_init();
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(TOLLGATE_LOG_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
