//! Tunable parameters of the Replay pipeline.

use std::time::Duration;

/// Estimated wall-clock length of a single Replay, used to offset the
/// availability estimate of later items in a non-queued batch.
pub const AVERAGE_REPLAY_MINUTES: i64 = 20;

/// Extra minutes added to every Replay window. The platform decides when a
/// Replay actually starts, so the window is widened to still cover `from`.
pub const START_OFFSET_MINUTES: i64 = 5;

/// Interval between status checks of a legacy (non-queued) Replay.
pub const STATUS_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum number of availability checks in flight at once.
pub const AVAILABILITY_CONCURRENCY: usize = 10;

/// Settings shared by every stage of a Replay batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySettings {
    pub average_replay_minutes: i64,
    pub start_offset_minutes: i64,
    pub status_check_interval: Duration,
    pub availability_concurrency: usize,
    /// Execution mode assumed when the plan-info probe fails: `true` selects
    /// queue mode.
    pub queue_mode_fallback: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            average_replay_minutes: AVERAGE_REPLAY_MINUTES,
            start_offset_minutes: START_OFFSET_MINUTES,
            status_check_interval: STATUS_CHECK_INTERVAL,
            availability_concurrency: AVAILABILITY_CONCURRENCY,
            queue_mode_fallback: true,
        }
    }
}

impl ReplaySettings {
    pub fn with_status_check_interval(mut self, interval: Duration) -> Self {
        self.status_check_interval = interval;
        self
    }

    pub fn with_availability_concurrency(mut self, concurrency: usize) -> Self {
        self.availability_concurrency = concurrency.max(1);
        self
    }

    pub fn with_average_replay_minutes(mut self, minutes: i64) -> Self {
        self.average_replay_minutes = minutes;
        self
    }

    pub fn with_queue_mode_fallback(mut self, queue_mode: bool) -> Self {
        self.queue_mode_fallback = queue_mode;
        self
    }
}
