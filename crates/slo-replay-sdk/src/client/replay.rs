//! Replay Operations
//!
//! Submission, status, availability, plan-info and queue management
//! endpoints, together with their wire models.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::{
    PlatformClient, ENDPOINT_PLAN_INFO, ENDPOINT_REPLAY, ENDPOINT_REPLAY_AVAILABILITY,
    ENDPOINT_REPLAY_CANCEL, ENDPOINT_REPLAY_LIST, PROJECTS_WILDCARD,
};
use crate::error::ApiError;

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;

/// Unit of a Replay duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "Minute",
            Self::Hour => "Hour",
            Self::Day => "Day",
        }
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length of the window a Replay imports, counted back from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDuration {
    pub unit: DurationUnit,
    pub value: i64,
}

impl ReplayDuration {
    pub fn minutes(value: i64) -> Self {
        Self {
            unit: DurationUnit::Minute,
            value,
        }
    }
}

/// SLO whose data seeds a Replay instead of the target SLO's own source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSlo {
    pub project: String,
    pub slo: String,
}

/// Request body for starting a Replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRequest {
    pub project: String,
    pub slo: String,
    pub duration: ReplayDuration,
    #[serde(rename = "sourceSLO", skip_serializing_if = "Option::is_none")]
    pub source_slo: Option<SourceSlo>,
}

/// Status of a Replay as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayStatus {
    Importing,
    Completed,
    Failed,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Progress section of a Replay status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayProgress {
    pub status: ReplayStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

/// Replay status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayWithStatus {
    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub slo: String,

    pub status: ReplayProgress,
}

/// Parameters of a Replay availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub data_source: String,
    pub data_source_kind: String,
    pub data_source_project: String,
    pub duration: ReplayDuration,
}

impl AvailabilityQuery {
    fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dataSource", self.data_source.clone()),
            ("dataSourceKind", self.data_source_kind.clone()),
            ("dataSourceProject", self.data_source_project.clone()),
            ("durationUnit", self.duration.unit.to_string()),
            ("durationValue", self.duration.value.to_string()),
        ]
    }
}

/// Why the platform cannot accept a Replay right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailabilityReason {
    IntegrationDoesNotSupportReplay,
    AgentVersionDoesNotSupportReplay,
    MaxHistoricalDataRetrievalTooLow,
    ConcurrentReplayRunsLimitExhausted,
    UnknownAgentVersion,
    Other(String),
}

impl UnavailabilityReason {
    pub fn from_code(code: &str) -> Self {
        match code {
            "integrationDoesNotSupportReplay" => Self::IntegrationDoesNotSupportReplay,
            "agentVersionDoesNotSupportReplay" => Self::AgentVersionDoesNotSupportReplay,
            "maxHistoricalDataRetrievalTooLow" => Self::MaxHistoricalDataRetrievalTooLow,
            "concurrentReplayRunsLimitExhausted" => Self::ConcurrentReplayRunsLimitExhausted,
            "unknownAgentVersion" => Self::UnknownAgentVersion,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Availability check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayAvailability {
    pub available: bool,

    #[serde(default)]
    pub reason: String,
}

impl ReplayAvailability {
    pub fn reason(&self) -> UnavailabilityReason {
        UnavailabilityReason::from_code(&self.reason)
    }
}

/// Organization plan entitlements relevant to Replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    #[serde(default)]
    pub enabled_playlists: bool,
}

/// Entry of the Replay queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayQueueItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slo: String,

    #[serde(default)]
    pub project: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_from: Option<String>,

    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<String>,
}

/// Request body for removing Replays from the queue.
#[derive(Debug, Serialize)]
struct DeleteReplayRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slo: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    all: bool,
}

/// Request body for cancelling an importing Replay.
#[derive(Debug, Serialize)]
struct CancelReplayRequest<'a> {
    project: &'a str,
    slo: &'a str,
}

impl PlatformClient {
    /// Start a Replay.
    ///
    /// # Errors
    ///
    /// A Replay already running for the same SLO is reported by the platform
    /// with HTTP 409; see [`ApiError::is_conflict`].
    pub async fn submit_replay(&self, request: &ReplayRequest) -> Result<(), ApiError> {
        self.request(
            Method::POST,
            ENDPOINT_REPLAY,
            &request.project,
            &[],
            Some(request),
        )
        .await?;
        info!(
            slo = %request.slo,
            project = %request.project,
            duration_minutes = request.duration.value,
            "Replay submitted"
        );
        Ok(())
    }

    /// Get the current status of the Replay running for an SLO.
    pub async fn replay_status(
        &self,
        project: &str,
        slo: &str,
    ) -> Result<ReplayWithStatus, ApiError> {
        self.get_json(&format!("{}/{}", ENDPOINT_REPLAY, slo), project, &[])
            .await
    }

    /// Ask whether a Replay of the given duration can currently be accepted
    /// for a metric source.
    pub async fn replay_availability(
        &self,
        project: &str,
        query: &AvailabilityQuery,
    ) -> Result<ReplayAvailability, ApiError> {
        self.get_json(ENDPOINT_REPLAY_AVAILABILITY, project, &query.to_query_pairs())
            .await
    }

    /// Read the organization's plan entitlements.
    pub async fn plan_info(&self) -> Result<PlanInfo, ApiError> {
        self.get_json(ENDPOINT_PLAN_INFO, PROJECTS_WILDCARD, &[])
            .await
    }

    /// List Replays in the queue across all projects.
    pub async fn list_replays(&self) -> Result<Vec<ReplayQueueItem>, ApiError> {
        self.get_json(ENDPOINT_REPLAY_LIST, PROJECTS_WILDCARD, &[])
            .await
    }

    /// Remove the queued Replays of a single SLO.
    pub async fn delete_replay(&self, project: &str, slo: &str) -> Result<(), ApiError> {
        let body = DeleteReplayRequest {
            project: Some(project),
            slo: Some(slo),
            all: false,
        };
        self.request(Method::DELETE, ENDPOINT_REPLAY, project, &[], Some(&body))
            .await?;
        Ok(())
    }

    /// Remove every queued Replay of the organization.
    pub async fn delete_all_replays(&self) -> Result<(), ApiError> {
        let body = DeleteReplayRequest {
            project: None,
            slo: None,
            all: true,
        };
        self.request(Method::DELETE, ENDPOINT_REPLAY, "", &[], Some(&body))
            .await?;
        Ok(())
    }

    /// Request cancellation of the importing phase of an SLO's Replay.
    pub async fn cancel_replay(&self, project: &str, slo: &str) -> Result<(), ApiError> {
        let body = CancelReplayRequest { project, slo };
        self.request(Method::POST, ENDPOINT_REPLAY_CANCEL, project, &[], Some(&body))
            .await?;
        Ok(())
    }
}
