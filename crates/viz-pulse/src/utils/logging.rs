//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Log to stderr at `level`, unless `RUST_LOG` says otherwise.
///
/// Stdout stays free for device listings and status lines.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed by a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
