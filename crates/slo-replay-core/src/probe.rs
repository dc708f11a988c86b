//! Detection of the Replay execution mode.

use tracing::{info, warn};

use crate::platform::ReplayPlatform;

/// How submitted Replays are executed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Replays are queued by the platform; a successful submit is final.
    Queue,
    /// Replays start immediately and are polled until they finish.
    Legacy,
}

impl ExecutionMode {
    pub fn is_queue(&self) -> bool {
        matches!(self, Self::Queue)
    }

    fn from_queue_flag(enabled: bool) -> Self {
        if enabled {
            Self::Queue
        } else {
            Self::Legacy
        }
    }
}

/// Ask the platform whether the organization has Replay queues.
///
/// Never fails: when the plan cannot be read, `fallback_to_queue` decides.
pub async fn probe_execution_mode(
    platform: &dyn ReplayPlatform,
    fallback_to_queue: bool,
) -> ExecutionMode {
    match platform.plan_info().await {
        Ok(plan) => {
            let mode = ExecutionMode::from_queue_flag(plan.enabled_playlists);
            info!(mode = ?mode, "Detected Replay execution mode");
            mode
        }
        Err(e) => {
            let mode = ExecutionMode::from_queue_flag(fallback_to_queue);
            warn!(
                error = %e,
                fallback = ?mode,
                "Failed to read plan info, using fallback Replay execution mode"
            );
            mode
        }
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
