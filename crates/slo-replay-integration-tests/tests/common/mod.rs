//! Common test utilities for SLO Replay integration tests
//!
//! This module provides:
//! - A mock platform server with helpers mounting each endpoint
//! - A real `PlatformClient` pointed at the mock server
//! - Builders for work items and fast test settings

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use slo_replay_core::{ReplayOrchestrator, ReplaySettings, ReplayWorkItem};
use slo_replay_sdk::{ClientConfig, PlatformClient, StaticTokenProvider};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "integration-token";
pub const ORGANIZATION: &str = "acme";

// ============================================================================
// Platform Client
// ============================================================================

pub fn client_for(server: &MockServer) -> PlatformClient {
    PlatformClient::builder(StaticTokenProvider::new(TOKEN))
        .config(
            ClientConfig::default()
                .with_api_url(server.uri())
                .with_organization(ORGANIZATION)
                .with_timeout(Duration::from_secs(5)),
        )
        .build()
        .unwrap()
}

/// Settings polling every 50ms so legacy-mode tests finish quickly.
pub fn fast_settings() -> ReplaySettings {
    ReplaySettings::default().with_status_check_interval(Duration::from_millis(50))
}

pub fn orchestrator_for(server: &MockServer) -> ReplayOrchestrator {
    ReplayOrchestrator::new(Arc::new(client_for(server)), fast_settings())
}

// ============================================================================
// Test Data
// ============================================================================

pub fn ts(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

/// Work item starting one hour ago.
pub fn item(project: &str, slo: &str) -> ReplayWorkItem {
    let from = chrono::Utc::now().fixed_offset() - chrono::Duration::hours(1);
    ReplayWorkItem::new(project, slo, from)
}

pub fn slo_json(project: &str, name: &str, source: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "n9/v1alpha",
        "kind": "SLO",
        "metadata": {"name": name, "project": project},
        "spec": {
            "indicator": {"metricSource": {"name": source, "project": project, "kind": "Agent"}},
            "objectives": [{"name": "good", "target": 0.99}]
        }
    })
}

pub fn composite_slo_json(project: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "metadata": {"name": name, "project": project},
        "spec": {
            "objectives": [{"name": "main", "composite": {"components": {"objectives": []}}}]
        }
    })
}

// ============================================================================
// Endpoint Mocks
// ============================================================================

pub async fn mount_slos(server: &MockServer, slos: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/get/slo"))
        .and(header("Project", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Array(slos)))
        .mount(server)
        .await;
}

pub async fn mount_plan(server: &MockServer, queues_enabled: bool) {
    Mock::given(method("GET"))
        .and(path("/internal/plan-info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"enabledPlaylists": queues_enabled})),
        )
        .mount(server)
        .await;
}

pub async fn mount_available(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/internal/timemachine/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"available": true})))
        .mount(server)
        .await;
}

pub async fn mount_unavailable(server: &MockServer, source: &str, reason: &str) {
    Mock::given(method("GET"))
        .and(path("/internal/timemachine/availability"))
        .and(query_param("dataSource", source))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "available": false,
            "reason": reason
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

pub async fn mount_submit(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/timetravel"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn mount_submit_for(server: &MockServer, slo: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path("/timetravel"))
        .and(body_partial_json(serde_json::json!({"slo": slo})))
        .respond_with(ResponseTemplate::new(status))
        .with_priority(1)
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, slo: &str, status: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/timetravel/{slo}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "slo": slo,
            "status": {"status": status}
        })))
        .mount(server)
        .await;
}

/// Requests received by the server for the given method and path.
pub async fn requests_to(server: &MockServer, verb: &str, route: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == route)
        .collect()
}
