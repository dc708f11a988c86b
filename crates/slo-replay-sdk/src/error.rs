//! Error types for platform API operations.
//!
//! Non-2xx responses are classified by their content type: a JSON body is
//! decoded into the platform's structured error list, anything else is kept
//! verbatim as an unexpected response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors during platform API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The platform rejected the request with a structured JSON error body.
    ///
    /// `message` is the title of the first entry in `errors`.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<ApiErrorDetail>,
    },

    /// Non-2xx response whose body is not a decodable JSON error.
    #[error("unexpected response (status: {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// HTTP client error (network, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failed to parse a successful response body.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client could not be constructed or a request could not be built.
    #[error("invalid client configuration: {message}")]
    Configuration { message: String },

    /// The access token could not be obtained.
    #[error("failed to obtain access token: {message}")]
    Authentication { message: String },
}

impl ApiError {
    /// HTTP status of the response, when the platform answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::UnexpectedResponse { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the platform reported a conflict (HTTP 409).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Build an error from a non-2xx response body.
    ///
    /// JSON bodies carrying at least one error entry become [`ApiError::Api`];
    /// everything else becomes [`ApiError::UnexpectedResponse`].
    pub fn from_response(status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        let is_json = content_type
            .map(|ct| ct.trim_start().starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            if let Ok(decoded) = serde_json::from_slice::<ApiErrorBody>(body) {
                if let Some(first) = decoded.errors.first() {
                    return Self::Api {
                        status,
                        message: first.title.clone(),
                        errors: decoded.errors,
                    };
                }
            }
        }

        Self::UnexpectedResponse {
            status,
            body: String::from_utf8_lossy(body).trim().to_string(),
        }
    }
}

/// Wire shape of a platform error response.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

/// A single entry of a platform error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApiErrorSource>,
}

/// Location of the property an error entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<String>,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
