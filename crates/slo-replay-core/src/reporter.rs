//! Per-item outcomes and the batch summary.

use tracing::info;

use crate::console::Console;
use crate::error::SubmissionError;
use crate::item::ReplayWorkItem;
use crate::submitter::ReplayState;

/// Result of processing one work item.
#[derive(Debug)]
pub struct ItemOutcome {
    pub item: ReplayWorkItem,
    pub result: Result<ReplayState, SubmissionError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a batch, parallel to and in the order of its input.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    outcomes: Vec<ItemOutcome>,
}

impl BatchOutcome {
    pub fn new(outcomes: Vec<ItemOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.len() - self.failed_count()
    }

    pub fn failed_items(&self) -> impl Iterator<Item = &ReplayWorkItem> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| &o.item)
    }

    /// One-paragraph summary of the batch.
    pub fn summary(&self) -> String {
        let failed = self.failed_count();
        if failed == 0 {
            return format!("Replay succeeded for all {} SLOs.", self.len());
        }

        let details: Vec<String> = self
            .failed_items()
            .map(|item| serde_json::to_string(item).unwrap_or_else(|_| item.label()))
            .collect();
        format!(
            "Replay succeeded for {} and failed for {} SLOs:\n - {}",
            self.succeeded_count(),
            failed,
            details.join("\n - ")
        )
    }

    pub fn print_summary(&self, console: &mut Console) {
        if self.is_empty() {
            return;
        }
        info!(
            succeeded = self.succeeded_count(),
            failed = self.failed_count(),
            "Replay batch finished"
        );
        console.line("");
        if self.failed_count() == 0 {
            console.success(&self.summary());
        } else {
            console.failure(&self.summary());
        }
    }
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
