//! Integration tests for the health endpoints.
//!
//! Run with: cargo test -p cerveceria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use cerveceria_integration_tests::{base_url, client};

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = base_url();

    for url in [format!("{base_url}/"), format!("{base_url}/api/health")] {
        let resp = client.get(&url).send().await.expect("Failed to get health");
        assert_eq!(resp.status(), StatusCode::OK, "health at {url}");
        let body: Value = resp.json().await.expect("Failed to parse health body");
        assert_eq!(body["status"], Value::String("ok".to_string()));
        assert!(body["timestamp"].as_str().is_some());
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_readiness_checks_the_database() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/health/ready"))
        .send()
        .await
        .expect("Failed to get readiness");
    assert_eq!(resp.status(), StatusCode::OK);
}
