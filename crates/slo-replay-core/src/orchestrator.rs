//! The bulk Replay pipeline.
//!
//! Verification, the execution-mode probe and availability checks all run
//! before the first submission. Any of them failing means nothing is
//! submitted.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::availability::check_availability;
use crate::console::Console;
use crate::error::ReplayError;
use crate::item::ReplayWorkItem;
use crate::platform::ReplayPlatform;
use crate::probe::{probe_execution_mode, ExecutionMode};
use crate::reporter::BatchOutcome;
use crate::resolver::{resolve, ResolveRequest};
use crate::settings::ReplaySettings;
use crate::submitter::Submitter;

/// Runs Replay batches against a platform.
#[derive(Clone)]
pub struct ReplayOrchestrator {
    platform: Arc<dyn ReplayPlatform>,
    settings: ReplaySettings,
}

impl ReplayOrchestrator {
    pub fn new(platform: Arc<dyn ReplayPlatform>, settings: ReplaySettings) -> Self {
        Self { platform, settings }
    }

    /// Resolve command input and run the resulting batch.
    pub async fn run(
        &self,
        request: &ResolveRequest,
        console: &mut Console,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, ReplayError> {
        let items = resolve(request)?;
        self.run_replays(items, console, cancel).await
    }

    /// Run an already resolved batch through verification, availability
    /// checks and submission, then print the summary.
    ///
    /// Returns the per-item outcomes; callers use
    /// [`BatchOutcome::failed_count`] to decide how to exit.
    pub async fn run_replays(
        &self,
        mut items: Vec<ReplayWorkItem>,
        console: &mut Console,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, ReplayError> {
        if items.is_empty() {
            return Ok(BatchOutcome::default());
        }
        info!(count = items.len(), "Starting Replay batch");

        cancellable(cancel, crate::verifier::verify_slos(self.platform.as_ref(), &mut items))
            .await?;

        let mode = cancellable(cancel, async {
            Ok(probe_execution_mode(self.platform.as_ref(), self.settings.queue_mode_fallback).await)
        })
        .await?;

        check_availability(
            Arc::clone(&self.platform),
            &items,
            mode,
            &self.settings,
            cancel,
        )
        .await?;

        if mode == ExecutionMode::Queue {
            console.notice("- Your organization has access to Replay queues!");
            console.notice("- Replays are executed by the queue; run 'slo-replay list' to follow them.");
        }

        let outcomes = Submitter::new(self.platform.as_ref(), &self.settings, mode)
            .process_batch(&items, console, cancel)
            .await?;

        let batch = BatchOutcome::new(outcomes);
        batch.print_summary(console);
        Ok(batch)
    }
}

/// Race a pipeline step against cancellation.
async fn cancellable<T, F>(cancel: &CancellationToken, step: F) -> Result<T, ReplayError>
where
    F: std::future::Future<Output = Result<T, ReplayError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReplayError::Cancelled),
        result = step => result,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
