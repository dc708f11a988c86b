//! Platform operations used by the Replay pipeline.
//!
//! [`ReplayPlatform`] is the seam between orchestration and HTTP. The
//! production implementation is [`PlatformClient`]; tests substitute
//! scripted fakes.

use async_trait::async_trait;
use slo_replay_sdk::{
    ApiError, AvailabilityQuery, PlanInfo, PlatformClient, ReplayAvailability, ReplayQueueItem,
    ReplayRequest, ReplayStatus, Slo,
};

/// Platform calls needed to verify, submit and manage Replays.
#[async_trait]
pub trait ReplayPlatform: Send + Sync {
    /// Fetch the named SLOs. Names that do not exist are simply absent.
    async fn get_slos(&self, project: &str, names: &[String]) -> Result<Vec<Slo>, ApiError>;

    async fn plan_info(&self) -> Result<PlanInfo, ApiError>;

    async fn replay_availability(
        &self,
        project: &str,
        query: &AvailabilityQuery,
    ) -> Result<ReplayAvailability, ApiError>;

    async fn submit_replay(&self, request: &ReplayRequest) -> Result<(), ApiError>;

    async fn replay_status(&self, project: &str, slo: &str) -> Result<ReplayStatus, ApiError>;

    async fn list_replays(&self) -> Result<Vec<ReplayQueueItem>, ApiError>;

    async fn delete_replay(&self, project: &str, slo: &str) -> Result<(), ApiError>;

    async fn delete_all_replays(&self) -> Result<(), ApiError>;

    async fn cancel_replay(&self, project: &str, slo: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ReplayPlatform for PlatformClient {
    async fn get_slos(&self, project: &str, names: &[String]) -> Result<Vec<Slo>, ApiError> {
        PlatformClient::get_slos(self, project, names).await
    }

    async fn plan_info(&self) -> Result<PlanInfo, ApiError> {
        PlatformClient::plan_info(self).await
    }

    async fn replay_availability(
        &self,
        project: &str,
        query: &AvailabilityQuery,
    ) -> Result<ReplayAvailability, ApiError> {
        PlatformClient::replay_availability(self, project, query).await
    }

    async fn submit_replay(&self, request: &ReplayRequest) -> Result<(), ApiError> {
        PlatformClient::submit_replay(self, request).await
    }

    async fn replay_status(&self, project: &str, slo: &str) -> Result<ReplayStatus, ApiError> {
        let replay = PlatformClient::replay_status(self, project, slo).await?;
        Ok(replay.status.status)
    }

    async fn list_replays(&self) -> Result<Vec<ReplayQueueItem>, ApiError> {
        PlatformClient::list_replays(self).await
    }

    async fn delete_replay(&self, project: &str, slo: &str) -> Result<(), ApiError> {
        PlatformClient::delete_replay(self, project, slo).await
    }

    async fn delete_all_replays(&self) -> Result<(), ApiError> {
        PlatformClient::delete_all_replays(self).await
    }

    async fn cancel_replay(&self, project: &str, slo: &str) -> Result<(), ApiError> {
        PlatformClient::cancel_replay(self, project, slo).await
    }
}
