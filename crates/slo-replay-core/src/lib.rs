//! # SLO Replay Core
//!
//! Orchestration of bulk Replays: historical-data backfills for many SLOs at
//! once.
//!
//! A batch flows through these stages in order:
//!
//! 1. [`resolver`] turns command input into validated [`ReplayWorkItem`]s
//! 2. [`verifier`] checks every SLO in one batched lookup
//! 3. [`probe`] detects whether the organization has Replay queues
//! 4. [`availability`] asks the platform whether each Replay can run now
//! 5. [`submitter`] submits items one by one, polling in legacy mode
//! 6. [`reporter`] summarises the per-item outcomes
//!
//! Stages 2 to 4 are all-or-nothing: nothing is submitted unless every item
//! passes. From stage 5 on, one item failing never stops the next.
//!
//! The platform is reached through the [`ReplayPlatform`] trait, implemented
//! for [`slo_replay_sdk::PlatformClient`].

pub mod availability;
pub mod console;
pub mod error;
pub mod item;
pub mod orchestrator;
pub mod platform;
pub mod probe;
pub mod queue;
pub mod reporter;
pub mod resolver;
pub mod settings;
pub mod submitter;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use availability::{check_availability, explain_unavailability, sequential_offset_minutes};
pub use console::{CapturedOutput, Console};
pub use error::{EntryLocation, ReplayError, SubmissionError, TIME_LAYOUT_NAME};
pub use item::{format_time, window_minutes, ReplayWorkItem};
pub use orchestrator::ReplayOrchestrator;
pub use platform::ReplayPlatform;
pub use probe::{probe_execution_mode, ExecutionMode};
pub use queue::{DeleteTarget, ReplayQueue};
pub use reporter::{BatchOutcome, ItemOutcome};
pub use resolver::{resolve, validate_arguments, ResolveRequest};
pub use settings::ReplaySettings;
pub use submitter::{ReplayState, Submitter};
pub use verifier::verify_slos;
