//! Tracing setup for embedding applications.

use tracing_subscriber::EnvFilter;

/// Install a formatted `tracing` subscriber. `RUST_LOG` wins over the
/// configured level; calling twice is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
