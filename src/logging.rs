use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
/// `default_level`. Calling it again after a subscriber is set does nothing.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
