//! Access token seam for the platform client.
//!
//! Obtaining tokens (client-credential exchange, refresh) is owned by the
//! caller. The client only asks a provider for the current bearer token
//! before each request.

use async_trait::async_trait;

use crate::error::ApiError;

/// Supplies bearer tokens for outgoing platform requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Return the token to place in the `Authorization` header.
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// Provider returning a fixed, pre-obtained token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, ApiError> {
        if self.token.is_empty() {
            return Err(ApiError::Authentication {
                message: "access token is empty".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}
