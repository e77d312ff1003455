//! Tracing subscriber setup from [`TrackerConfig`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TrackerConfig;
use crate::errors::TrackerError;

/// Builds the level filter for `config`.
///
/// # Errors
///
/// `TrackerError::Config` if `log_level` is not a valid filter directive.
pub fn env_filter(config: &TrackerConfig) -> Result<EnvFilter, TrackerError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TrackerError::Config(format!("invalid log level '{}': {e}", config.log_level)))
}

/// Installs a global subscriber writing to stderr, as JSON when
/// `config.json_logs` is set.
///
/// # Errors
///
/// `TrackerError::Config` if the filter is invalid or a global subscriber
/// is already installed.
pub fn init_tracing(config: &TrackerConfig) -> Result<(), TrackerError> {
    let filter = env_filter(config)?;

    let (json, plain) = if config.json_logs {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
        .map_err(|e| TrackerError::Config(format!("failed to install tracing subscriber: {e}")))
}
