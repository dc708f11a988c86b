//! Management of queued and running Replays.

use slo_replay_sdk::{ReplayQueueItem, PROJECTS_WILDCARD};
use tracing::info;

use crate::console::Console;
use crate::error::ReplayError;
use crate::platform::ReplayPlatform;

/// What a delete request removes from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Slo { project: String, slo: String },
    All,
}

impl DeleteTarget {
    /// Build a target from command input: either one SLO name or `all`.
    pub fn from_args(names: &[String], all: bool, project: &str) -> Result<Self, ReplayError> {
        if names.len() > 1 {
            return Err(ReplayError::TooManyArguments);
        }
        match (names.first(), all) {
            (None, true) => Ok(Self::All),
            (Some(slo), false) => {
                require_specific_project(project)?;
                Ok(Self::Slo {
                    project: project.to_string(),
                    slo: slo.clone(),
                })
            }
            _ => Err(ReplayError::InvalidDeleteOptions),
        }
    }
}

fn require_specific_project(project: &str) -> Result<(), ReplayError> {
    if project == PROJECTS_WILDCARD {
        return Err(ReplayError::WildcardProject);
    }
    Ok(())
}

/// List, delete and cancel operations on the Replay queue.
pub struct ReplayQueue<'a> {
    platform: &'a dyn ReplayPlatform,
}

impl<'a> ReplayQueue<'a> {
    pub fn new(platform: &'a dyn ReplayPlatform) -> Self {
        Self { platform }
    }

    pub async fn list(&self, console: &mut Console) -> Result<Vec<ReplayQueueItem>, ReplayError> {
        console.notice("Listing all Replays");
        let replays = self.platform.list_replays().await?;
        info!(count = replays.len(), "Listed Replays");
        if replays.is_empty() {
            console.muted("No Replays found");
        }
        Ok(replays)
    }

    pub async fn delete(
        &self,
        target: &DeleteTarget,
        console: &mut Console,
    ) -> Result<(), ReplayError> {
        match target {
            DeleteTarget::All => {
                console.notice("Deleting all replays from queue");
                self.platform.delete_all_replays().await?;
                info!("Deleted all queued Replays");
                console.success("All replays in queue deleted successfully");
            }
            DeleteTarget::Slo { project, slo } => {
                console.notice(&format!(
                    "Deleting replays from a queue for SLO {} in project {}",
                    slo, project
                ));
                self.platform.delete_replay(project, slo).await?;
                info!(slo = %slo, project = %project, "Deleted queued Replays");
                console.success(&format!(
                    "Replays from queue for SLO {} in project {} deleted successfully",
                    slo, project
                ));
            }
        }
        Ok(())
    }

    /// Request cancellation of the importing phase of an SLO's Replay.
    pub async fn cancel(
        &self,
        project: &str,
        slo: &str,
        console: &mut Console,
    ) -> Result<(), ReplayError> {
        require_specific_project(project)?;
        console.notice(&format!(
            "Canceling importing phase of Replay for SLO '{}' in project '{}'",
            slo, project
        ));
        self.platform.cancel_replay(project, slo).await?;
        info!(slo = %slo, project = %project, "Requested Replay cancellation");
        console.success(&format!(
            "Cancellation of Replay for SLO '{}' in project '{}' successfully requested.",
            slo, project
        ));
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
