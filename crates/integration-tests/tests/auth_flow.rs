//! Integration tests for registration and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p cerveceria-api)
//!
//! Run with: cargo test -p cerveceria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use cerveceria_integration_tests::{base_url, client, register_user};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_then_login() {
    let client = client();
    let user = register_user(&client).await;
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({
            "email": user.email,
            "password": "contraseña-segura"
        }))
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse login response");
    assert!(
        body["access_token"]
            .as_str()
            .is_some_and(|t| !t.is_empty())
    );
    assert_eq!(body["user"]["email"], json!(user.email));
    // The password hash must never appear in API responses
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_email_conflict() {
    let client = client();
    let user = register_user(&client).await;
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/registro"))
        .json(&json!({
            "name": "Otro Cliente",
            "email": user.email,
            "password": "otra-contraseña",
            "birthDate": "1985-01-01"
        }))
        .send()
        .await
        .expect("Failed to send duplicate registration");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["statusCode"], json!(409));
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_wrong_password() {
    let client = client();
    let user = register_user(&client).await;
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({
            "email": user.email,
            "password": "incorrecta"
        }))
        .send()
        .await
        .expect("Failed to send login");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_underage_rejected() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/registro"))
        .json(&json!({
            "name": "Menor",
            "email": format!("menor-{}@example.com", uuid::Uuid::new_v4().simple()),
            "password": "contraseña-segura",
            "birthDate": "2015-06-01"
        }))
        .send()
        .await
        .expect("Failed to send registration");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_protected_route_requires_token() {
    let client = client();
    let user = register_user(&client).await;
    let base_url = base_url();

    // Without a token
    let resp = client
        .get(format!("{base_url}/api/usuarios/{}", user.user_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // With the bearer token
    let resp = client
        .get(format!("{base_url}/api/usuarios/{}", user.user_id))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
}
