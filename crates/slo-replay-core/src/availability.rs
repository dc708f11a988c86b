//! Pre-flight availability checks with bounded concurrency.
//!
//! Every item is checked before anything is submitted. Checks run in a pool
//! capped by a semaphore and share one cancellation token: a failed request
//! cancels the checks still waiting or in flight. An unavailable item is a
//! business result, not a failure, and is only reported once the pool has
//! drained.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use slo_replay_sdk::{AvailabilityQuery, ReplayDuration, UnavailabilityReason};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::ReplayError;
use crate::item::{format_time, window_minutes, ReplayWorkItem};
use crate::platform::ReplayPlatform;
use crate::probe::ExecutionMode;
use crate::settings::ReplaySettings;

/// Minutes added to an item's window to account for the Replays ahead of it
/// in a non-queued batch still running when it starts.
pub fn sequential_offset_minutes(index: usize, mode: ExecutionMode, average_minutes: i64) -> i64 {
    match mode {
        ExecutionMode::Queue => 0,
        ExecutionMode::Legacy => index as i64 * average_minutes,
    }
}

/// Check that every item can be replayed now.
///
/// Fails with [`ReplayError::Unavailable`] listing every unavailable item in
/// batch order, or with the first request failure.
pub async fn check_availability(
    platform: Arc<dyn ReplayPlatform>,
    items: &[ReplayWorkItem],
    mode: ExecutionMode,
    settings: &ReplaySettings,
    cancel: &CancellationToken,
) -> Result<(), ReplayError> {
    let token = cancel.child_token();
    let permits = Arc::new(Semaphore::new(settings.availability_concurrency.max(1)));
    let unavailable: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let mut tasks: JoinSet<Result<(), ReplayError>> = JoinSet::new();

    for (index, item) in items.iter().enumerate() {
        if item.metric_source.is_none() {
            return Err(ReplayError::TaskFailed {
                message: format!("{} has not been verified", item.label()),
            });
        }

        let check = AvailabilityCheck {
            index,
            item: item.clone(),
            offset_minutes: sequential_offset_minutes(
                index,
                mode,
                settings.average_replay_minutes,
            ),
            settings: settings.clone(),
        };
        let platform = Arc::clone(&platform);
        let permits = Arc::clone(&permits);
        let unavailable = Arc::clone(&unavailable);
        let token = token.clone();

        tasks.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(()),
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        return Err(ReplayError::TaskFailed {
                            message: e.to_string(),
                        })
                    }
                },
            };

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(()),
                result = check.run(platform.as_ref()) => result,
            };

            match result {
                Ok(None) => Ok(()),
                Ok(Some(line)) => {
                    unavailable.lock().await.push((check.index, line));
                    Ok(())
                }
                Err(e) => {
                    token.cancel();
                    Err(e)
                }
            }
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap_or_else(|e| {
            Err(ReplayError::TaskFailed {
                message: e.to_string(),
            })
        });
        if let Err(e) = outcome {
            token.cancel();
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    if let Some(e) = first_error {
        error!(error = %e, "Replay availability check failed");
        return Err(e);
    }
    if cancel.is_cancelled() {
        return Err(ReplayError::Cancelled);
    }

    let mut unavailable = std::mem::take(&mut *unavailable.lock().await);
    if unavailable.is_empty() {
        debug!(count = items.len(), "All SLOs are available for Replay");
        return Ok(());
    }

    unavailable.sort_by_key(|(index, _)| *index);
    Err(ReplayError::Unavailable {
        details: unavailable.into_iter().map(|(_, line)| line).collect(),
    })
}

/// A single availability query and what is needed to explain its answer.
struct AvailabilityCheck {
    index: usize,
    item: ReplayWorkItem,
    offset_minutes: i64,
    settings: ReplaySettings,
}

impl AvailabilityCheck {
    /// Returns the explanation line when the item is unavailable.
    async fn run(&self, platform: &dyn ReplayPlatform) -> Result<Option<String>, ReplayError> {
        let Some(source) = &self.item.metric_source else {
            return Ok(None);
        };

        let now = Utc::now();
        let expected_minutes = window_minutes(self.item.from, now, self.settings.start_offset_minutes)
            + self.offset_minutes;
        let query = AvailabilityQuery {
            data_source: source.name.clone(),
            data_source_kind: source.kind.clone(),
            data_source_project: source.project.clone(),
            duration: ReplayDuration::minutes(expected_minutes),
        };

        let availability = platform
            .replay_availability(&self.item.project, &query)
            .await
            .map_err(|source| ReplayError::AvailabilityCheck {
                slo: self.item.slo.clone(),
                project: self.item.project.clone(),
                source,
            })?;

        if availability.available {
            return Ok(None);
        }

        warn!(
            slo = %self.item.slo,
            project = %self.item.project,
            reason = %availability.reason,
            "SLO is not available for Replay"
        );
        let explanation = explain_unavailability(
            &availability.reason(),
            &self.item,
            expected_minutes,
            self.offset_minutes,
            now,
            &self.settings,
        );
        Ok(Some(format!("[{}] {}", self.item.label(), explanation)))
    }
}

/// Human-readable explanation of an unavailability reason.
pub fn explain_unavailability(
    reason: &UnavailabilityReason,
    item: &ReplayWorkItem,
    expected_minutes: i64,
    offset_minutes: i64,
    now: DateTime<Utc>,
    settings: &ReplaySettings,
) -> String {
    let (source_name, source_project, source_kind) = match &item.metric_source {
        Some(s) => (s.name.as_str(), s.project.as_str(), s.kind.as_str()),
        None => ("", "", ""),
    };

    match reason {
        UnavailabilityReason::IntegrationDoesNotSupportReplay => {
            format!("{} Data Source does not support Replay yet", source_kind)
        }
        UnavailabilityReason::AgentVersionDoesNotSupportReplay => format!(
            "Update your '{}' Agent in '{}' Project version to the latest to use Replay for this Data Source.",
            source_name, source_project
        ),
        UnavailabilityReason::MaxHistoricalDataRetrievalTooLow => {
            let offset_notice = if offset_minutes > 0 {
                format!(
                    " + {} (offset for each next replay run in bulk is increased by an average of {})",
                    format_minutes(offset_minutes),
                    format_minutes(settings.average_replay_minutes)
                )
            } else {
                String::new()
            };
            format!(
                "Value configured for spec.historicalDataRetrieval.maxDuration.value for '{}' Data Source \
                 in '{}' Project is lower than the duration you're trying to run Replay for. \
                 The calculated duration is: {}, calculated from: {} (now) - {} (from) \
                 + {}m (start offset to ensure Replay covers the desired time window){}. \
                 Edit the Data Source and run Replay once again.",
                source_name,
                source_project,
                format_minutes(expected_minutes),
                now.to_rfc3339_opts(SecondsFormat::Secs, true),
                format_time(&item.from),
                settings.start_offset_minutes,
                offset_notice
            )
        }
        UnavailabilityReason::ConcurrentReplayRunsLimitExhausted => {
            "You've exceeded the limit of concurrent Replay runs. Wait until the current Replay(s) are done."
                .to_string()
        }
        UnavailabilityReason::UnknownAgentVersion => {
            "Your Agent isn't connected to the Data Source. Deploy the Agent and run Replay once again."
                .to_string()
        }
        UnavailabilityReason::Other(code) => code.clone(),
    }
}

/// Render minutes as e.g. `1h5m`, or `45m` below an hour.
fn format_minutes(minutes: i64) -> String {
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
