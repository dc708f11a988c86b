//! Layered CLI configuration.
//!
//! Sources, later ones overriding earlier ones:
//!  1. built-in defaults
//!  2. the TOML file given with `--config`, or `<config dir>/slo-replay/config.toml`
//!  3. environment variables prefixed `SLO_REPLAY__` (double-underscore
//!     separator), e.g. `SLO_REPLAY__REPLAY__AVERAGE_REPLAY_MINUTES=30`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slo_replay_core::ReplaySettings;
use slo_replay_sdk::ApiError;
use tracing::{debug, info};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SLO_REPLAY";

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("context '{name}' is not defined in the configuration")]
    UnknownContext { name: String },

    #[error("multiple contexts are defined, select one with '--context' or set 'default_context'")]
    AmbiguousContext,

    #[error("missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to create platform client: {0}")]
    Client(#[source] ApiError),
}

/// CLI configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Context used when `--context` is not given
    pub default_context: Option<String>,

    /// Named platform connections
    pub contexts: BTreeMap<String, ContextConfig>,

    /// Replay tuning
    pub replay: ReplayConfig,
}

/// Connection settings of one platform context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextConfig {
    pub url: String,
    pub organization: Option<String>,
    /// Project used when a command does not name one
    pub project: String,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/api".to_string(),
            organization: None,
            project: "default".to_string(),
            access_token: None,
            timeout_seconds: 30,
        }
    }
}

impl std::fmt::Display for ContextConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (project: {})", self.url, self.project)
    }
}

impl ContextConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check that the context can be used to reach the platform.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "url".to_string(),
            });
        }
        url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidValue {
            key: "url".to_string(),
            message: e.to_string(),
        })?;
        if self.access_token.as_deref().unwrap_or_default().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "access_token".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Replay tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub average_replay_minutes: i64,
    pub start_offset_minutes: i64,
    pub status_check_interval_seconds: u64,
    pub availability_concurrency: usize,
    /// Use queue mode when the organization plan cannot be read
    pub queue_mode_fallback: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        let settings = ReplaySettings::default();
        Self {
            average_replay_minutes: settings.average_replay_minutes,
            start_offset_minutes: settings.start_offset_minutes,
            status_check_interval_seconds: settings.status_check_interval.as_secs(),
            availability_concurrency: settings.availability_concurrency,
            queue_mode_fallback: settings.queue_mode_fallback,
        }
    }
}

impl ReplayConfig {
    pub fn to_settings(&self) -> Result<ReplaySettings, ConfigError> {
        if self.status_check_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "replay.status_check_interval_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.average_replay_minutes < 0 || self.start_offset_minutes < 0 {
            return Err(ConfigError::InvalidValue {
                key: "replay".to_string(),
                message: "durations cannot be negative".to_string(),
            });
        }

        let mut settings = ReplaySettings::default()
            .with_status_check_interval(Duration::from_secs(self.status_check_interval_seconds))
            .with_availability_concurrency(self.availability_concurrency)
            .with_average_replay_minutes(self.average_replay_minutes)
            .with_queue_mode_fallback(self.queue_mode_fallback);
        settings.start_offset_minutes = self.start_offset_minutes;
        Ok(settings)
    }
}

impl CliConfig {
    /// Select the context named on the command line, falling back to
    /// `default_context`, then to the only defined context.
    pub fn context(&self, name: Option<&str>) -> Result<ContextConfig, ConfigError> {
        if let Some(name) = name.or(self.default_context.as_deref()) {
            return self
                .contexts
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownContext {
                    name: name.to_string(),
                });
        }

        let mut contexts = self.contexts.values();
        match (contexts.next(), contexts.next()) {
            (None, _) => Ok(ContextConfig::default()),
            (Some(only), None) => Ok(only.clone()),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousContext),
        }
    }
}

/// Default configuration file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("slo-replay").join("config.toml"))
}

/// Load configuration from defaults, an optional file and the environment.
///
/// An explicitly given file must exist. The default file is optional.
/// `skip_files` ignores both.
pub fn load_configuration(path: Option<&Path>, skip_files: bool) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if !skip_files {
        match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration from explicit path");
                builder = builder.add_source(
                    config::File::from(path)
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    debug!(path = %default_path.display(), "Loading configuration from default path");
                    builder = builder.add_source(
                        config::File::from(default_path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }
    }

    let config = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
