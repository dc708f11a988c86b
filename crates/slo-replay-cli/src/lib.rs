//! # SLO Replay CLI
//!
//! Command-line interface for running historical-data Replays for many SLOs
//! at once.
//!
//! This module provides CLI commands for:
//! - Running a Replay batch from a single SLO name or work-item files
//! - Listing the Replay queue
//! - Deleting queued Replays and cancelling running ones
//! - Generating shell completions

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slo_replay_core::{
    resolve, Console, DeleteTarget, ReplayError, ReplayOrchestrator, ReplayPlatform, ReplayQueue,
    ReplaySettings, ReplayWorkItem, ResolveRequest, TIME_LAYOUT_NAME,
};
use slo_replay_sdk::{ApiError, ReplayQueueItem};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod client;
pub mod config;
pub mod logging;

pub use crate::config::{CliConfig, ConfigError, ContextConfig, ReplayConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// slo-replay - bulk historical-data Replays for SLOs
#[derive(Debug, Parser)]
#[command(name = "slo-replay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run historical-data Replays for many SLOs at once")]
#[command(
    long_about = "Replay imports historical metric data for SLOs and recomputes their error budgets. \
                  Batches are verified and checked for availability before anything is submitted."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SLO_REPLAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Ignore configuration files and use only defaults and environment variables
    #[arg(long, global = true)]
    pub no_config_file: bool,

    /// Configuration context to use
    #[arg(long, env = "SLO_REPLAY_CONTEXT", global = true)]
    pub context: Option<String>,

    /// Logging level
    #[arg(
        short,
        long,
        default_value = "warn",
        global = true,
        value_parser = ["trace", "debug", "info", "warn", "error", "off"]
    )]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay historical data for one SLO or for every SLO in the given files
    Run {
        /// Name of the SLO to replay
        #[arg(value_name = "SLO")]
        names: Vec<String>,

        /// YAML file with a list of Replay entries, may be repeated
        #[arg(short, long = "file", value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Project of the SLO; defaults to the context's project
        #[arg(short, long)]
        project: Option<String>,

        /// Start of the Replay window (RFC3339)
        #[arg(long, value_parser = parse_time)]
        from: Option<DateTime<FixedOffset>>,
    },

    /// List queued and running Replays
    List {
        /// Output format
        #[arg(short, long, default_value = "yaml")]
        output: OutputFormat,
    },

    /// Delete queued Replays of one SLO, or of every SLO with --all
    Delete {
        /// Name of the SLO
        #[arg(value_name = "SLO")]
        names: Vec<String>,

        /// Delete every queued Replay
        #[arg(long)]
        all: bool,

        /// Project of the SLO; defaults to the context's project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Cancel the importing phase of an SLO's running Replay
    Cancel {
        /// Name of the SLO
        #[arg(value_name = "SLO")]
        slo: String,

        /// Project of the SLO; defaults to the context's project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Output format of the queue listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
    Toml,
}

fn parse_time(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| format!("'{value}' is not a valid {TIME_LAYOUT_NAME} time: {e}"))
}

// ============================================================================
// Error Types
// ============================================================================

/// CLI error types
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Replay failed for {failed} of {total} SLOs")]
    ItemsFailed { failed: usize, total: usize },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    #[error("Failed to render output: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Replay(e) if e.is_input_error() => 2,
            Self::Replay(e) if e.is_cancelled() => 130,
            Self::Replay(_) | Self::Api(_) => 4,
            Self::Configuration(_) => 3,
            Self::ItemsFailed { .. } => 5,
            Self::Logging { .. } | Self::Output { .. } | Self::Io(_) => 1,
        }
    }
}

// ============================================================================
// Main CLI Entry Point
// ============================================================================

/// Parse the command line and execute the selected command.
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    logging::initialize_logging(&cli.log_level, cli.json_logs)?;
    debug!(command = ?cli.command, "Parsed command line");

    if let Commands::Completions { shell } = &cli.command {
        return execute_completions_command(*shell);
    }

    let config = crate::config::load_configuration(cli.config.as_deref(), cli.no_config_file)?;
    let context = config.context(cli.context.as_deref())?;
    let settings = config.replay.to_settings()?;
    let mut console = Console::stdout(!cli.no_color);

    let cancel = CancellationToken::new();
    let _interrupt = spawn_interrupt_handler(cancel.clone());

    match cli.command {
        Commands::Run {
            names,
            files,
            project,
            from,
        } => {
            let request = ResolveRequest {
                files,
                names,
                from,
                project: project.unwrap_or_else(|| context.project.clone()),
            };
            let items = resolve(&request)?;
            let platform = client::shared_platform(&context)?;
            execute_run_command(platform, settings, items, &mut console, &cancel).await
        }
        Commands::List { output } => {
            let platform = client::shared_platform(&context)?;
            execute_list_command(platform.as_ref(), output, &mut console).await
        }
        Commands::Delete {
            names,
            all,
            project,
        } => {
            let project = project.unwrap_or_else(|| context.project.clone());
            let target = DeleteTarget::from_args(&names, all, &project)?;
            let platform = client::shared_platform(&context)?;
            execute_delete_command(platform.as_ref(), &target, &mut console).await
        }
        Commands::Cancel { slo, project } => {
            let project = project.unwrap_or_else(|| context.project.clone());
            let platform = client::shared_platform(&context)?;
            execute_cancel_command(platform.as_ref(), &project, &slo, &mut console).await
        }
        Commands::Completions { shell } => execute_completions_command(shell),
    }
}

/// Cancel the token on Ctrl-C so in-flight checks and polls stop.
fn spawn_interrupt_handler(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, aborting");
                cancel.cancel();
            }
            Err(e) => debug!(error = %e, "Interrupt handler unavailable"),
        }
    })
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Run a resolved batch and fail when any item failed.
pub async fn execute_run_command(
    platform: Arc<dyn ReplayPlatform>,
    settings: ReplaySettings,
    items: Vec<ReplayWorkItem>,
    console: &mut Console,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let orchestrator = ReplayOrchestrator::new(platform, settings);
    let outcome = orchestrator.run_replays(items, console, cancel).await?;

    info!(
        total = outcome.len(),
        failed = outcome.failed_count(),
        "Replay batch finished"
    );
    if outcome.failed_count() > 0 {
        return Err(CliError::ItemsFailed {
            failed: outcome.failed_count(),
            total: outcome.len(),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct ReplayListing<'a> {
    replays: &'a [ReplayQueueItem],
}

/// Render the Replay queue in the requested format.
pub fn render_replays(replays: &[ReplayQueueItem], format: OutputFormat) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(replays).map_err(|e| e.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(replays).map_err(|e| e.to_string()),
        OutputFormat::Toml => {
            toml::to_string(&ReplayListing { replays }).map_err(|e| e.to_string())
        }
    };
    rendered.map_err(|message| CliError::Output { message })
}

pub async fn execute_list_command(
    platform: &dyn ReplayPlatform,
    format: OutputFormat,
    console: &mut Console,
) -> Result<(), CliError> {
    let replays = ReplayQueue::new(platform).list(console).await?;
    if !replays.is_empty() {
        let rendered = render_replays(&replays, format)?;
        console.line(rendered.trim_end());
    }
    Ok(())
}

pub async fn execute_delete_command(
    platform: &dyn ReplayPlatform,
    target: &DeleteTarget,
    console: &mut Console,
) -> Result<(), CliError> {
    ReplayQueue::new(platform).delete(target, console).await?;
    Ok(())
}

pub async fn execute_cancel_command(
    platform: &dyn ReplayPlatform,
    project: &str,
    slo: &str,
    console: &mut Console,
) -> Result<(), CliError> {
    ReplayQueue::new(platform).cancel(project, slo, console).await?;
    Ok(())
}

fn execute_completions_command(shell: clap_complete::Shell) -> Result<(), CliError> {
    info!(shell = ?shell, "Generating shell completions");
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
