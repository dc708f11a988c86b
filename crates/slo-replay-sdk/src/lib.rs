//! # SLO Replay SDK
//!
//! HTTP client for the Replay-related endpoints of the SLO platform.
//!
//! This SDK provides:
//! - A project-scoped request transport with bearer authentication
//! - Typed wrappers for Replay submission, status polling, availability
//!   checks, queue management and the plan-info probe
//! - A batched SLO lookup used to verify Replay eligibility
//! - Structured decoding of platform error bodies
//!
//! # Examples
//!
//! ```no_run
//! use slo_replay_sdk::{ClientConfig, PlatformClient, StaticTokenProvider};
//!
//! # async fn example() -> Result<(), slo_replay_sdk::ApiError> {
//! let client = PlatformClient::builder(StaticTokenProvider::new("token"))
//!     .config(ClientConfig::default().with_api_url("https://platform.example.com/api"))
//!     .build()?;
//!
//! let plan = client.plan_info().await?;
//! println!("queues enabled: {}", plan.enabled_playlists);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::{
    AvailabilityQuery, ClientConfig, ClientConfigBuilder, DurationUnit, Indicator, MetricSource,
    Objective, PlanInfo, PlatformClient, PlatformClientBuilder, ReplayAvailability,
    ReplayDuration, ReplayProgress, ReplayQueueItem, ReplayRequest, ReplayStatus,
    ReplayWithStatus, Slo, SloMetadata, SloSpec, SourceSlo, UnavailabilityReason,
    HEADER_ORGANIZATION, HEADER_PROJECT, PROJECTS_WILDCARD,
};
pub use error::{ApiError, ApiErrorDetail, ApiErrorSource};
