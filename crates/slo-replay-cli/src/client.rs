//! Platform client construction from a configuration context.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use slo_replay_core::ReplayPlatform;
use slo_replay_sdk::{ClientConfig, PlatformClient, StaticTokenProvider};
use tracing::debug;

use crate::config::{ConfigError, ContextConfig};

/// User agent sent by the command-line tool.
pub const USER_AGENT: &str = concat!("slo-replay/", env!("CARGO_PKG_VERSION"));

/// Build an authenticated client for the given context.
pub fn build_client(context: &ContextConfig) -> Result<PlatformClient, ConfigError> {
    context.validate()?;

    let token = context.access_token.clone().unwrap_or_default();
    let config = ClientConfig::builder()
        .api_url(context.url.clone())
        .timeout(context.timeout())
        .user_agent(USER_AGENT)
        .organization(context.organization.clone())
        .build();

    debug!(context = %context, "Creating platform client");
    PlatformClient::builder(StaticTokenProvider::new(token))
        .config(config)
        .build()
        .map_err(ConfigError::Client)
}

static SHARED_CLIENT: OnceCell<Arc<PlatformClient>> = OnceCell::new();

/// Process-wide client, built on first use and reused by every command.
///
/// The context passed on later calls is ignored once the client exists.
pub fn shared_platform(context: &ContextConfig) -> Result<Arc<dyn ReplayPlatform>, ConfigError> {
    let client = SHARED_CLIENT.get_or_try_init(|| build_client(context).map(Arc::new))?;
    Ok(Arc::clone(client) as Arc<dyn ReplayPlatform>)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
