//! Log output setup for binaries and tools embedding the crate

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `IMULINK_LOG=imulink=debug`
pub const LOG_ENV: &str = "IMULINK_LOG";

/// Filter from [`LOG_ENV`], falling back to `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a stderr `fmt` subscriber.
///
/// Returns `false` when a global subscriber was already installed, which is
/// not an error: the existing one keeps receiving events.
pub fn init_logging(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(env_filter(default_filter))
        .try_init()
        .is_ok()
}
