//! Diagnostic logging setup.
//!
//! Library code logs through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter on stderr, which also receives `log`
//! records. `RUST_LOG` takes precedence over the `-v` count.

use crate::error::{BootstrapError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Maps the number of `-v` flags to a default log level.
///
/// # Examples
///
/// ```
/// use library_bootstrap::logging::level_for_verbosity;
/// use tracing_subscriber::filter::LevelFilter;
///
/// assert_eq!(level_for_verbosity(0), LevelFilter::WARN);
/// assert_eq!(level_for_verbosity(2), LevelFilter::DEBUG);
/// ```
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_for_verbosity(verbosity).into())
        .from_env_lossy()
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns [`BootstrapError::Logging`] if a global subscriber or logger is
/// already installed.
pub fn init(verbosity: u8) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| BootstrapError::Logging(err.to_string()))
}
