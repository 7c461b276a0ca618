//! Diagnostic logging setup.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Diagnostics go to stderr so stdout stays reserved for user-facing output
/// such as dry-run messages. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let include_target = default_level >= LevelFilter::DEBUG;

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(include_target)
        .with_writer(std::io::stderr)
        .try_init();
}
