//! Tracing subscriber setup shared by the binaries.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// Install a JSON formatter filtered by `RUST_LOG` (default `info`).
///
/// A second call, or a subscriber installed elsewhere, only produces a
/// warning.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}
