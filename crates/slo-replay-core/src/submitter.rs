//! Sequential submission and status polling.
//!
//! Items are submitted one after another in batch order. In queue mode a
//! successful submit is final. In legacy mode the Replay is polled on a
//! fixed interval until it completes or fails. Cancellation always wins
//! over a pending tick.

use chrono::Utc;
use slo_replay_sdk::ReplayStatus;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::{ReplayError, SubmissionError};
use crate::item::{format_time, ReplayWorkItem};
use crate::platform::ReplayPlatform;
use crate::probe::ExecutionMode;
use crate::reporter::ItemOutcome;
use crate::settings::ReplaySettings;

/// Lifecycle of a single Replay as seen by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Accepted into the platform queue. Terminal here; the queue owns the rest.
    Queued,
    Importing,
    Completed,
    Failed,
}

impl ReplayState {
    /// State right after the platform accepted the submission.
    pub fn after_submit(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Queue => Self::Queued,
            ExecutionMode::Legacy => Self::Importing,
        }
    }

    /// Apply a polled status. Unknown statuses leave the state unchanged.
    pub fn observe(self, status: ReplayStatus) -> Self {
        match status {
            ReplayStatus::Completed => Self::Completed,
            ReplayStatus::Failed => Self::Failed,
            ReplayStatus::Importing => Self::Importing,
            ReplayStatus::Unknown => self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Queued | Self::Completed | Self::Failed)
    }
}

/// Submits items and, in legacy mode, waits for them to finish.
pub struct Submitter<'a> {
    platform: &'a dyn ReplayPlatform,
    settings: &'a ReplaySettings,
    mode: ExecutionMode,
}

impl<'a> Submitter<'a> {
    pub fn new(
        platform: &'a dyn ReplayPlatform,
        settings: &'a ReplaySettings,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            platform,
            settings,
            mode,
        }
    }

    /// Process the whole batch in order.
    ///
    /// An item failure is recorded and the next item is attempted.
    /// Cancellation stops the batch immediately.
    pub async fn process_batch(
        &self,
        items: &[ReplayWorkItem],
        console: &mut Console,
        cancel: &CancellationToken,
    ) -> Result<Vec<ItemOutcome>, ReplayError> {
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, item) in items.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ReplayError::Cancelled);
            }

            console.progress(&format!(
                "[{}/{}] SLO: {}, Project: {}, From: {}, To: {}",
                i + 1,
                total,
                item.slo,
                item.project,
                format_time(&item.from),
                format_time(&item.window_end(Utc::now()))
            ));
            match self.mode {
                ExecutionMode::Queue => console.line("Replay is added to the queue..."),
                ExecutionMode::Legacy => console.line("Importing data..."),
            }

            let result = self.run(item, cancel).await;
            match &result {
                Ok(_) => match self.mode {
                    ExecutionMode::Queue => {
                        console.success("Replay has been successfully added to the queue!")
                    }
                    ExecutionMode::Legacy => console.success("Import succeeded!"),
                },
                Err(SubmissionError::Cancelled) => return Err(ReplayError::Cancelled),
                Err(e) => match self.mode {
                    ExecutionMode::Queue => {
                        console.failure(&format!("Failed to add Replay to the queue: {}", e))
                    }
                    ExecutionMode::Legacy => console.failure(&format!("Import failed: {}", e)),
                },
            }

            outcomes.push(ItemOutcome {
                item: item.clone(),
                result,
            });
        }

        Ok(outcomes)
    }

    /// Submit one item and drive it to a terminal state.
    pub async fn run(
        &self,
        item: &ReplayWorkItem,
        cancel: &CancellationToken,
    ) -> Result<ReplayState, SubmissionError> {
        self.submit(item, cancel).await?;
        let state = ReplayState::after_submit(self.mode);
        if state.is_terminal() {
            return Ok(state);
        }
        self.poll(item, state, cancel).await
    }

    async fn submit(
        &self,
        item: &ReplayWorkItem,
        cancel: &CancellationToken,
    ) -> Result<(), SubmissionError> {
        let request = item.replay_request(Utc::now(), self.settings);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SubmissionError::Cancelled),
            result = self.platform.submit_replay(&request) => result,
        };

        result.map_err(|e| {
            warn!(slo = %item.slo, project = %item.project, error = %e, "Replay submission failed");
            if e.is_conflict() {
                SubmissionError::AlreadyExists {
                    slo: item.slo.clone(),
                    project: item.project.clone(),
                }
            } else {
                SubmissionError::SubmitFailed(e)
            }
        })
    }

    async fn poll(
        &self,
        item: &ReplayWorkItem,
        mut state: ReplayState,
        cancel: &CancellationToken,
    ) -> Result<ReplayState, SubmissionError> {
        let period = self.settings.status_check_interval;
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(slo = %item.slo, project = %item.project, "Replay status polling aborted");
                    return Err(SubmissionError::Cancelled);
                }
                _ = ticks.tick() => {}
            }

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SubmissionError::Cancelled),
                status = self.platform.replay_status(&item.project, &item.slo) => status,
            };
            let status = status.map_err(|e| {
                warn!(slo = %item.slo, project = %item.project, error = %e, "Replay status check failed");
                SubmissionError::StatusCheckFailed(e)
            })?;

            let next = state.observe(status);
            if next != state {
                debug!(
                    slo = %item.slo,
                    project = %item.project,
                    from = ?state,
                    to = ?next,
                    "Replay state changed"
                );
            }
            state = next;

            match state {
                ReplayState::Completed => return Ok(state),
                ReplayState::Failed => return Err(SubmissionError::ReplayFailed),
                _ => continue,
            }
        }
    }
}

#[cfg(test)]
#[path = "submitter_tests.rs"]
mod tests;
