//! Scripted platform used by the unit tests of this crate.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use slo_replay_sdk::{
    ApiError, AvailabilityQuery, Indicator, MetricSource, Objective, PlanInfo, ReplayAvailability,
    ReplayQueueItem, ReplayRequest, ReplayStatus, Slo, SloMetadata, SloSpec,
};

use crate::item::ReplayWorkItem;
use crate::platform::ReplayPlatform;

pub(crate) fn ts(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

pub(crate) fn item(project: &str, slo: &str) -> ReplayWorkItem {
    ReplayWorkItem::new(project, slo, ts("2024-05-01T10:00:00Z"))
}

/// Work item already enriched with the metric source the verifier would set.
pub(crate) fn verified_item(project: &str, slo: &str, source: &str) -> ReplayWorkItem {
    let mut work_item = item(project, slo);
    work_item.metric_source = Some(metric_source(project, source));
    work_item
}

pub(crate) fn metric_source(project: &str, name: &str) -> MetricSource {
    MetricSource {
        name: name.to_string(),
        project: project.to_string(),
        kind: "Agent".to_string(),
    }
}

pub(crate) fn slo(project: &str, name: &str, source: &str) -> Slo {
    Slo {
        metadata: SloMetadata {
            name: name.to_string(),
            project: project.to_string(),
            display_name: None,
        },
        spec: SloSpec {
            indicator: Some(Indicator {
                metric_source: metric_source(project, source),
            }),
            objectives: vec![Objective::default()],
            composite: None,
        },
    }
}

pub(crate) fn composite_slo(project: &str, name: &str) -> Slo {
    Slo {
        metadata: SloMetadata {
            name: name.to_string(),
            project: project.to_string(),
            display_name: None,
        },
        spec: SloSpec {
            indicator: None,
            objectives: vec![Objective::default()],
            composite: Some(serde_json::json!({ "maxDelay": "45m" })),
        },
    }
}

pub(crate) fn api_error(status: u16, message: &str) -> ApiError {
    ApiError::Api {
        status,
        message: message.to_string(),
        errors: vec![],
    }
}

/// How the mock answers a submission.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SubmitOutcome {
    Conflict,
    ServerError,
}

/// Mock platform with per-SLO scripted answers and a call log.
#[derive(Default)]
pub(crate) struct MockPlatform {
    slos: Vec<Slo>,
    lookup_fails: bool,
    plan: Option<PlanInfo>,
    unavailable: HashMap<String, String>,
    availability_failures: HashSet<String>,
    availability_delay: Option<Duration>,
    submit_outcomes: HashMap<String, SubmitOutcome>,
    statuses: Mutex<HashMap<String, VecDeque<ReplayStatus>>>,
    queue: Vec<ReplayQueueItem>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MockPlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_slos(mut self, slos: Vec<Slo>) -> Self {
        self.slos = slos;
        self
    }

    pub(crate) fn with_lookup_failure(mut self) -> Self {
        self.lookup_fails = true;
        self
    }

    /// Plan answer. Without one, the plan-info call fails.
    pub(crate) fn with_plan(mut self, enabled_playlists: bool) -> Self {
        self.plan = Some(PlanInfo { enabled_playlists });
        self
    }

    pub(crate) fn with_unavailable(mut self, data_source: &str, reason: &str) -> Self {
        self.unavailable
            .insert(data_source.to_string(), reason.to_string());
        self
    }

    pub(crate) fn with_availability_failure(mut self, data_source: &str) -> Self {
        self.availability_failures.insert(data_source.to_string());
        self
    }

    pub(crate) fn with_availability_delay(mut self, delay: Duration) -> Self {
        self.availability_delay = Some(delay);
        self
    }

    pub(crate) fn with_submit_outcome(mut self, slo: &str, outcome: SubmitOutcome) -> Self {
        self.submit_outcomes.insert(slo.to_string(), outcome);
        self
    }

    /// Statuses returned by successive status checks. The last one repeats.
    pub(crate) fn with_statuses(self, slo: &str, statuses: Vec<ReplayStatus>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(slo.to_string(), statuses.into());
        self
    }

    pub(crate) fn with_queue(mut self, queue: Vec<ReplayQueueItem>) -> Self {
        self.queue = queue;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReplayPlatform for MockPlatform {
    async fn get_slos(&self, project: &str, names: &[String]) -> Result<Vec<Slo>, ApiError> {
        self.record(format!("get_slos:{}:{}", project, names.join(",")));
        if self.lookup_fails {
            return Err(api_error(500, "lookup failed"));
        }
        Ok(self
            .slos
            .iter()
            .filter(|s| names.contains(&s.metadata.name))
            .cloned()
            .collect())
    }

    async fn plan_info(&self) -> Result<PlanInfo, ApiError> {
        self.record("plan_info".to_string());
        self.plan.ok_or_else(|| api_error(503, "plan info unavailable"))
    }

    async fn replay_availability(
        &self,
        project: &str,
        query: &AvailabilityQuery,
    ) -> Result<ReplayAvailability, ApiError> {
        self.record(format!(
            "availability:{}:{}:{}",
            project, query.data_source, query.duration.value
        ));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.availability_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.availability_failures.contains(&query.data_source) {
            return Err(api_error(502, "bad gateway"));
        }
        Ok(match self.unavailable.get(&query.data_source) {
            Some(reason) => ReplayAvailability {
                available: false,
                reason: reason.clone(),
            },
            None => ReplayAvailability {
                available: true,
                reason: String::new(),
            },
        })
    }

    async fn submit_replay(&self, request: &ReplayRequest) -> Result<(), ApiError> {
        self.record(format!(
            "submit:{}:{}:{}",
            request.project, request.slo, request.duration.value
        ));
        match self.submit_outcomes.get(&request.slo) {
            Some(SubmitOutcome::Conflict) => Err(api_error(409, "conflict")),
            Some(SubmitOutcome::ServerError) => Err(api_error(500, "internal error")),
            None => Ok(()),
        }
    }

    async fn replay_status(&self, project: &str, slo: &str) -> Result<ReplayStatus, ApiError> {
        self.record(format!("status:{}:{}", project, slo));
        let mut statuses = self.statuses.lock().unwrap();
        let Some(script) = statuses.get_mut(slo) else {
            return Ok(ReplayStatus::Completed);
        };
        let status = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        Ok(status.unwrap_or(ReplayStatus::Completed))
    }

    async fn list_replays(&self) -> Result<Vec<ReplayQueueItem>, ApiError> {
        self.record("list".to_string());
        Ok(self.queue.clone())
    }

    async fn delete_replay(&self, project: &str, slo: &str) -> Result<(), ApiError> {
        self.record(format!("delete:{}:{}", project, slo));
        Ok(())
    }

    async fn delete_all_replays(&self) -> Result<(), ApiError> {
        self.record("delete_all".to_string());
        Ok(())
    }

    async fn cancel_replay(&self, project: &str, slo: &str) -> Result<(), ApiError> {
        self.record(format!("cancel:{}:{}", project, slo));
        Ok(())
    }
}
