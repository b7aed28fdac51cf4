//! Integration tests for the Cervecería API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! cargo run -p cerveceria-cli -- migrate
//!
//! # Start the API (mock payment mode: leave FLOW_API_KEY unset)
//! cargo run -p cerveceria-api
//!
//! # Run integration tests
//! cargo test -p cerveceria-integration-tests -- --ignored
//! ```
//!
//! The tests talk to a live server over HTTP and are `#[ignore]`d by
//! default so `cargo test` stays hermetic.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CERVECERIA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build a plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A registered test user with its bearer token.
pub struct TestUser {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

/// Register a fresh user (unique email) and return its token.
///
/// # Panics
///
/// Panics if registration fails or the response is malformed.
pub async fn register_user(client: &Client) -> TestUser {
    let email = format!("test-{}@example.com", Uuid::new_v4().simple());
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/registro"))
        .json(&json!({
            "name": "Test Cliente",
            "email": email,
            "password": "contraseña-segura",
            "birthDate": "1990-05-14"
        }))
        .send()
        .await
        .expect("Failed to register test user");

    assert_eq!(resp.status(), 201, "registration should return 201");

    let body: Value = resp.json().await.expect("Failed to read auth response");
    let token = body["access_token"]
        .as_str()
        .expect("access_token missing")
        .to_owned();
    let user_id = body["user"]["id"].as_str().expect("user id missing").to_owned();

    TestUser {
        token,
        user_id,
        email,
    }
}

/// Add a shipping address to the user and return its id.
///
/// # Panics
///
/// Panics if the request fails or the response is malformed.
pub async fn add_address(client: &Client, user: &TestUser) -> String {
    let base_url = base_url();
    let resp = client
        .post(format!(
            "{base_url}/api/usuarios/{}/direcciones",
            user.user_id
        ))
        .bearer_auth(&user.token)
        .json(&json!({
            "street": "Av. Italia",
            "number": "1234",
            "comuna": "Providencia",
            "city": "Santiago",
            "region": "Metropolitana",
            "isPrimary": true
        }))
        .send()
        .await
        .expect("Failed to add address");

    assert_eq!(resp.status(), 201, "adding an address should return 201");
    let body: Value = resp.json().await.expect("Failed to parse address");
    body["id"].as_str().expect("address id missing").to_owned()
}

/// Fetch the product list and return the first active product's id.
///
/// Requires a seeded catalog (`cerveceria seed`).
///
/// # Panics
///
/// Panics if the catalog is empty or the request fails.
pub async fn any_product_id(client: &Client) -> String {
    let base_url = base_url();
    let resp = client
        .get(format!("{base_url}/api/productos"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), 200);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse product list");
    products
        .first()
        .and_then(|p| p["id"].as_str())
        .expect("catalog is empty, run `cerveceria seed` first")
        .to_owned()
}
