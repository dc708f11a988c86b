//! Tests for SLO lookup.

use super::*;

fn slo_from(value: serde_json::Value) -> Slo {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_metric_source_is_read_from_indicator() {
    let slo = slo_from(serde_json::json!({
        "apiVersion": "n9/v1alpha",
        "kind": "SLO",
        "metadata": {"name": "latency", "project": "web"},
        "spec": {
            "indicator": {"metricSource": {"name": "prom", "project": "monitoring", "kind": "Direct"}},
            "objectives": [{"name": "ok", "target": 0.99}]
        }
    }));

    assert!(!slo.is_composite());
    let source = slo.metric_source().unwrap();
    assert_eq!(source.name, "prom");
    assert_eq!(source.project, "monitoring");
    assert_eq!(source.kind, "Direct");
}

#[test]
fn test_metric_source_kind_defaults_to_agent() {
    let slo = slo_from(serde_json::json!({
        "metadata": {"name": "latency", "project": "web"},
        "spec": {"indicator": {"metricSource": {"name": "prom", "project": "web"}}}
    }));

    assert_eq!(slo.metric_source().unwrap().kind, "Agent");
}

#[test]
fn test_objective_composite_marks_slo_composite() {
    let slo = slo_from(serde_json::json!({
        "metadata": {"name": "overall", "project": "web"},
        "spec": {
            "objectives": [
                {"name": "main", "composite": {"components": {"objectives": []}}}
            ]
        }
    }));

    assert!(slo.is_composite());
    assert!(slo.metric_source().is_none());
}

#[test]
fn test_legacy_composite_marks_slo_composite() {
    let slo = slo_from(serde_json::json!({
        "metadata": {"name": "overall", "project": "web"},
        "spec": {"composite": {"target": 0.9}, "objectives": []}
    }));

    assert!(slo.is_composite());
}

#[test]
fn test_null_composite_is_ignored() {
    let slo = slo_from(serde_json::json!({
        "metadata": {"name": "latency", "project": "web"},
        "spec": {"composite": null, "objectives": [{"composite": null}]}
    }));

    assert!(!slo.is_composite());
}
