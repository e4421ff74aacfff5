//! Logging initialisation
//!
//! Installs a global `tracing` subscriber. `RUST_LOG` wins when set;
//! otherwise [`LoggingConfig::level`] is used as the filter directive.

use cranepay_domain::{LoggingConfig, PayrollError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter for `config`.
///
/// # Errors
/// Returns `PayrollError::Config` if `RUST_LOG` is unset and the configured
/// level is not a valid filter directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| PayrollError::Config(format!("Invalid log level '{}': {e}", config.level))),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, so repeated
/// calls (tests, embedding applications) are harmless.
///
/// # Errors
/// Returns `PayrollError::Config` for an invalid level directive.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = env_filter(config)?;

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(true)).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(level = %config.level, json = config.json, "Logging initialised");
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}
