//! Platform API client for Replay operations.
//!
//! This module provides the `PlatformClient` which issues project-scoped,
//! bearer-authenticated requests against the SLO platform. Every request
//! carries a `Project` header naming the logical tenant it applies to; the
//! wildcard `*` is used for organization-wide reads.

mod replay;
mod slo;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::AccessTokenProvider;
use crate::error::ApiError;

pub use replay::{
    AvailabilityQuery, DurationUnit, PlanInfo, ReplayAvailability, ReplayDuration, ReplayProgress,
    ReplayQueueItem, ReplayRequest, ReplayStatus, ReplayWithStatus, SourceSlo,
    UnavailabilityReason,
};
pub use slo::{Indicator, MetricSource, Objective, Slo, SloMetadata, SloSpec};

/// Header carrying the project (tenant) a request is scoped to.
pub const HEADER_PROJECT: &str = "Project";

/// Header carrying the organization a request is scoped to.
pub const HEADER_ORGANIZATION: &str = "Organization";

/// Project value selecting every project the caller can see.
pub const PROJECTS_WILDCARD: &str = "*";

pub(crate) const ENDPOINT_REPLAY: &str = "/timetravel";
pub(crate) const ENDPOINT_REPLAY_CANCEL: &str = "/timetravel/cancel";
pub(crate) const ENDPOINT_REPLAY_LIST: &str = "/timetravel/list";
pub(crate) const ENDPOINT_REPLAY_AVAILABILITY: &str = "/internal/timemachine/availability";
pub(crate) const ENDPOINT_PLAN_INFO: &str = "/internal/plan-info";
pub(crate) const ENDPOINT_GET_SLO: &str = "/get/slo";

/// Configuration for platform client behavior.
///
/// # Examples
///
/// ```
/// use slo_replay_sdk::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_api_url("https://platform.example.com/api");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string for API requests
    pub user_agent: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// Platform API base URL
    pub api_url: String,
    /// Organization sent with every request, if any
    pub organization: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("slo-replay/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            api_url: "http://localhost:8080/api".to_string(),
            organization: None,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the platform API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the organization header value.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

/// Builder for constructing `ClientConfig` instances.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the platform API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the organization header value, or clear it with `None`.
    pub fn organization(mut self, organization: Option<String>) -> Self {
        self.config.organization = organization;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform API client.
///
/// Cheap to clone; clones share the underlying connection pool and token
/// provider.
///
/// # Examples
///
/// ```no_run
/// # use slo_replay_sdk::{ClientConfig, PlatformClient, StaticTokenProvider};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PlatformClient::builder(StaticTokenProvider::new("token"))
///     .config(ClientConfig::default())
///     .build()?;
///
/// let queue = client.list_replays().await?;
/// println!("{} Replays queued", queue.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PlatformClient {
    auth: Arc<dyn AccessTokenProvider>,
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl PlatformClient {
    /// Create a new builder for constructing a platform client.
    pub fn builder(auth: impl AccessTokenProvider + 'static) -> PlatformClientBuilder {
        PlatformClientBuilder::new(auth)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue a request and return the raw response payload.
    ///
    /// `project` is sent in the [`HEADER_PROJECT`] header; an empty value
    /// omits the header. `query` pairs may repeat a key.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if:
    /// - the access token cannot be obtained
    /// - the HTTP request fails (network error, timeout, etc.)
    /// - the platform answers with a non-2xx status
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        project: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Bytes, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.auth.access_token().await?;
        let url = self.endpoint_url(path);

        debug!(method = %method, url = %url, project = %project, "Sending platform request");

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json");
        if !project.is_empty() {
            request = request.header(HEADER_PROJECT, project);
        }
        if let Some(organization) = &self.config.organization {
            request = request.header(HEADER_ORGANIZATION, organization);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let payload = response.bytes().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), content_type.as_deref(), &payload);
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                error = %err,
                "Platform request failed"
            );
            return Err(err);
        }

        Ok(payload)
    }

    /// Issue a request without a body and decode the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        project: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let payload = self
            .request::<()>(Method::GET, path, project, query, None)
            .await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("config", &self.config)
            .field("auth", &"<AccessTokenProvider>")
            .finish()
    }
}

/// Builder for constructing `PlatformClient` instances.
pub struct PlatformClientBuilder {
    auth: Arc<dyn AccessTokenProvider>,
    config: Option<ClientConfig>,
}

impl PlatformClientBuilder {
    fn new(auth: impl AccessTokenProvider + 'static) -> Self {
        Self {
            auth: Arc::new(auth),
            config: None,
        }
    }

    /// Set the client configuration.
    ///
    /// If not set, uses `ClientConfig::default()`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the platform client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the API URL is not a valid
    /// absolute URL or the HTTP client cannot be created.
    pub fn build(self) -> Result<PlatformClient, ApiError> {
        let config = self.config.unwrap_or_default();

        url::Url::parse(&config.api_url).map_err(|e| ApiError::Configuration {
            message: format!("invalid API URL '{}': {}", config.api_url, e),
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(PlatformClient {
            auth: self.auth,
            http_client,
            config,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
