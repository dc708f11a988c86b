//! Replay work items and window arithmetic.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta, Utc};
use serde::Serialize;
use slo_replay_sdk::{MetricSource, ReplayDuration, ReplayRequest, SourceSlo};

use crate::settings::ReplaySettings;

/// A single SLO to replay.
///
/// `(slo, project)` is unique within a batch. `metric_source` is filled in by
/// the verifier and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayWorkItem {
    pub project: String,
    pub slo: String,
    pub from: DateTime<FixedOffset>,
    #[serde(rename = "sourceSLO", skip_serializing_if = "Option::is_none")]
    pub source_slo: Option<SourceSlo>,
    #[serde(skip)]
    pub metric_source: Option<MetricSource>,
}

impl ReplayWorkItem {
    pub fn new(
        project: impl Into<String>,
        slo: impl Into<String>,
        from: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            project: project.into(),
            slo: slo.into(),
            from,
            source_slo: None,
            metric_source: None,
        }
    }

    pub fn with_source_slo(mut self, project: impl Into<String>, slo: impl Into<String>) -> Self {
        self.source_slo = Some(SourceSlo {
            project: project.into(),
            slo: slo.into(),
        });
        self
    }

    /// Human-readable identity used in error bullets.
    pub fn label(&self) -> String {
        slo_label(&self.slo, &self.project)
    }

    /// Build the submission body for a Replay starting now.
    pub fn replay_request(&self, now: DateTime<Utc>, settings: &ReplaySettings) -> ReplayRequest {
        ReplayRequest {
            project: self.project.clone(),
            slo: self.slo.clone(),
            duration: ReplayDuration::minutes(window_minutes(
                self.from,
                now,
                settings.start_offset_minutes,
            )),
            source_slo: self.source_slo.clone(),
        }
    }

    /// `now` rendered in the offset `from` was given in.
    pub fn window_end(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(self.from.offset())
    }
}

pub(crate) fn slo_label(slo: &str, project: &str) -> String {
    format!("'{}' SLO in '{}' Project", slo, project)
}

/// Minutes between `from` and `now`, rounded up, plus the start offset.
///
/// A `from` in the future contributes nothing beyond the offset.
pub fn window_minutes(from: DateTime<FixedOffset>, now: DateTime<Utc>, start_offset: i64) -> i64 {
    let elapsed = (now - from.with_timezone(&Utc)).max(TimeDelta::zero());
    let mut minutes = elapsed.num_minutes();
    if elapsed > TimeDelta::minutes(minutes) {
        minutes += 1;
    }
    minutes + start_offset
}

/// Format a timestamp the way it is shown to users.
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
