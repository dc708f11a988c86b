//! Tracing subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` overrides the `--log-level` flag.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::CliError;

/// Build the filter used when `RUST_LOG` is not set.
pub fn default_filter(level: &str) -> Result<EnvFilter, CliError> {
    let directives = format!("slo_replay_cli={level},slo_replay_core={level},slo_replay_sdk={level},warn");
    EnvFilter::try_new(directives).map_err(|e| CliError::Logging {
        message: format!("invalid log level '{level}': {e}"),
    })
}

pub fn initialize_logging(level: &str, json: bool) -> Result<(), CliError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}
