//! SLO lookup
//!
//! Only the parts of the SLO definition needed to decide Replay eligibility
//! are modelled; everything else in the response is ignored.

use serde::{Deserialize, Serialize};

use crate::client::{PlatformClient, ENDPOINT_GET_SLO};
use crate::error::ApiError;

#[cfg(test)]
#[path = "slo_tests.rs"]
mod tests;

const DEFAULT_METRIC_SOURCE_KIND: &str = "Agent";

/// SLO definition as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slo {
    pub metadata: SloMetadata,

    #[serde(default)]
    pub spec: SloSpec,
}

/// Identity of an SLO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SloMetadata {
    pub name: String,

    #[serde(default)]
    pub project: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The eligibility-relevant part of an SLO specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SloSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<Indicator>,

    #[serde(default)]
    pub objectives: Vec<Objective>,

    /// Legacy single-objective composite definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<serde_json::Value>,
}

/// Indicator of an SLO.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub metric_source: MetricSource,
}

/// Metric source (data source) an SLO reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSource {
    pub name: String,

    #[serde(default)]
    pub project: String,

    #[serde(default = "default_metric_source_kind")]
    pub kind: String,
}

fn default_metric_source_kind() -> String {
    DEFAULT_METRIC_SOURCE_KIND.to_string()
}

/// Objective of an SLO.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Objective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<serde_json::Value>,
}

impl Slo {
    /// Whether the SLO is computed from other SLOs.
    pub fn is_composite(&self) -> bool {
        let has_composite = |value: &Option<serde_json::Value>| {
            value.as_ref().map(|v| !v.is_null()).unwrap_or(false)
        };
        has_composite(&self.spec.composite)
            || self
                .spec
                .objectives
                .iter()
                .any(|objective| has_composite(&objective.composite))
    }

    /// The metric source the SLO reads from, if it has an indicator.
    pub fn metric_source(&self) -> Option<&MetricSource> {
        self.spec
            .indicator
            .as_ref()
            .map(|indicator| &indicator.metric_source)
    }
}

impl PlatformClient {
    /// Look up SLOs by name in a single request.
    ///
    /// `project` scopes the lookup; pass [`crate::PROJECTS_WILDCARD`] to
    /// search every project the caller can see.
    pub async fn get_slos(&self, project: &str, names: &[String]) -> Result<Vec<Slo>, ApiError> {
        let query: Vec<(&str, String)> = names.iter().map(|n| ("name", n.clone())).collect();
        self.get_json(ENDPOINT_GET_SLO, project, &query).await
    }
}
