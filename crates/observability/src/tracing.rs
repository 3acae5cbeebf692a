//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init() {
    init_with_default(DEFAULT_DIRECTIVES)
}

/// Initialize with explicit fallback directives.
///
/// `RUST_LOG` still wins when set; the directives only fill in for an
/// unset environment. Tests use this to crank individual targets up
/// without mutating the process environment.
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_target(false)
        .try_init();
}
