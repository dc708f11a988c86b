//! Tests for client construction.

use super::*;

fn context() -> ContextConfig {
    ContextConfig {
        url: "https://platform.example.com/api".to_string(),
        organization: Some("acme".to_string()),
        access_token: Some("token".to_string()),
        timeout_seconds: 12,
        ..Default::default()
    }
}

#[test]
fn test_client_uses_context_settings() {
    let client = build_client(&context()).unwrap();

    let config = client.config();
    assert_eq!(config.api_url, "https://platform.example.com/api");
    assert_eq!(config.organization.as_deref(), Some("acme"));
    assert_eq!(config.timeout, std::time::Duration::from_secs(12));
    assert!(config.user_agent.starts_with("slo-replay/"));
}

#[test]
fn test_missing_token_rejected() {
    let context = ContextConfig {
        access_token: None,
        ..context()
    };
    assert!(matches!(
        build_client(&context),
        Err(ConfigError::MissingRequired { .. })
    ));
}

/// Verify that the shared client is built once and reused.
#[test]
fn test_shared_client_reused() {
    let first = shared_platform(&context()).unwrap();
    let other = ContextConfig {
        url: "https://other.example.com".to_string(),
        ..context()
    };
    let second = shared_platform(&other).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}
