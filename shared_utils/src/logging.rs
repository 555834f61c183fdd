//! Tracing subscriber setup for the workspace binaries.

pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber writing to stderr.
///
/// The filter defaults to `default_level` and can be overridden with `RUST_LOG`.
/// Output goes to stderr so that stdout stays free for machine-readable results.
pub fn init_logging(default_level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        .init()
}
