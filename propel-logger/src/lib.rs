//! Logging helper
//!
//! Used by tests and host binaries to get consistent output
//! from the `tracing` events emitted by `propel-reactive`.

// Imports
use {
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{EnvFilter, prelude::*},
};

/// Initializes logging.
///
/// The filter defaults to `INFO` and may be overridden with `RUST_LOG`.
/// Colors may be disabled by setting `RUST_LOG_COLOR` to anything other
/// than `1`, `yes` or `true`.
///
/// Calling this more than once is allowed, only the first call installs
/// the subscriber.
pub fn init() {
	let log_use_color = env::var("RUST_LOG_COLOR").map_or(true, |value| {
		matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
	});

	let filter = EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy();
	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(log_use_color)
		.with_test_writer()
		.with_filter(filter);

	// Note: Each test may call us, so a subscriber might already be installed.
	_ = tracing_subscriber::registry().with(layer).try_init();
}
