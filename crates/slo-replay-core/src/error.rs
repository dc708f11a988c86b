//! Error types for Replay orchestration.
//!
//! [`ReplayError`] aborts a whole command. [`SubmissionError`] belongs to a
//! single work item and never stops the rest of the batch; it is recorded in
//! the item's outcome instead.

use std::path::PathBuf;

use slo_replay_sdk::ApiError;
use thiserror::Error;

/// Layout accepted for Replay window start times.
pub const TIME_LAYOUT_NAME: &str = "RFC3339";

/// Position of a work item inside an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub path: PathBuf,
    /// 1-based index of the entry within the file
    pub index: usize,
}

impl std::fmt::Display for EntryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry {} of {}", self.index, self.path.display())
    }
}

/// Errors that abort a Replay command.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(
        "you must either run 'slo-replay run' for a single SLO, providing its name as an argument, \
         or provide configuration file using '-f' flag, but not both"
    )]
    InvalidOptions,

    #[error(
        "you must either run 'slo-replay delete' for a single SLO, providing its name as an argument, \
         or use the '--all' flag to delete all queued replays, but not both"
    )]
    InvalidDeleteOptions,

    #[error(
        "the command accepts a single SLO name, if you want to run it for multiple SLOs \
         provide a configuration file instead using '-f' flag"
    )]
    TooManyArguments,

    #[error(
        "when running 'slo-replay run' for a single SLO, you must provide Replay window start time \
         ({} layout) with '--from' flag",
        TIME_LAYOUT_NAME
    )]
    MissingFrom,

    #[error("wildcard Project is not allowed, you must provide specific Project name(s)")]
    WildcardProject,

    #[error("Project of the SLO is empty, provide it with '-p' flag")]
    MissingProject,

    #[error("failed to read Replay config from: {}: {source}", .path.display())]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Replay config from: {}: {source}", .path.display())]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Replay config {location} failed validation: '{field}' is required")]
    InvalidEntry {
        location: EntryLocation,
        field: &'static str,
    },

    #[error("no Replay definitions were found in the provided configuration files")]
    EmptyBatch,

    #[error(
        "duplicated Replay definition detected for '{slo}' SLO in '{project}' Project \
         ({first} and {second})"
    )]
    DuplicateEntry {
        slo: String,
        project: String,
        first: EntryLocation,
        second: EntryLocation,
    },

    #[error("failed to look up SLOs marked for Replay: {0}")]
    Lookup(#[source] ApiError),

    #[error("{}", verification_message(.missing, .composite))]
    Verification {
        missing: Vec<String>,
        composite: Vec<String>,
    },

    #[error("failed to check Replay availability for '{slo}' SLO in '{project}' Project: {source}")]
    AvailabilityCheck {
        slo: String,
        project: String,
        #[source]
        source: ApiError,
    },

    #[error("The following SLOs are not available for Replay: \n - {}", .details.join("\n - "))]
    Unavailable { details: Vec<String> },

    #[error("availability check task failed: {message}")]
    TaskFailed { message: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("operation aborted")]
    Cancelled,
}

impl ReplayError {
    /// Whether the error stems from invalid user input rather than the platform.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOptions
                | Self::InvalidDeleteOptions
                | Self::TooManyArguments
                | Self::MissingFrom
                | Self::WildcardProject
                | Self::MissingProject
                | Self::ConfigFileRead { .. }
                | Self::ConfigFileParse { .. }
                | Self::InvalidEntry { .. }
                | Self::EmptyBatch
                | Self::DuplicateEntry { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

fn verification_message(missing: &[String], composite: &[String]) -> String {
    let mut sections = Vec::new();
    if !missing.is_empty() {
        sections.push(format!(
            "Some of the SLOs marked for Replay were not found or you don't have permissions \
             to view them: \n - {}",
            missing.join("\n - ")
        ));
    }
    if !composite.is_empty() {
        sections.push(format!(
            "The following SLOs are composite and not eligible for Replay: \n - {}",
            composite.join("\n - ")
        ));
    }
    sections.join("\n")
}

/// Failure of a single work item during submission or polling.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Replay for SLO: '{slo}' in project: '{project}' already exists")]
    AlreadyExists { slo: String, project: String },

    #[error("failed to start new Replay: {0}")]
    SubmitFailed(#[source] ApiError),

    #[error("failed to get Replay status: {0}")]
    StatusCheckFailed(#[source] ApiError),

    #[error("Replay has failed")]
    ReplayFailed,

    /// The surrounding command was aborted; not a failure of the item itself.
    #[error("operation aborted")]
    Cancelled,
}

impl SubmissionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
