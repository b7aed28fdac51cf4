//! Integration tests for the admin-only surface.
//!
//! A regular customer token must get 403 on these routes; 404 or 405
//! would mean the route is not mounted.
//!
//! Run with: cargo test -p cerveceria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::json;

use cerveceria_integration_tests::{base_url, client, register_user};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_order_routes_reject_customers() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;

    let resp = client
        .get(format!(
            "{base_url}/api/pedidos/admin/todos?estado=Procesando&fechaInicio=2024-01-01&fechaFin=2030-12-31"
        ))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to list all orders");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .get(format!("{base_url}/api/pedidos/admin/estadisticas"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to get stats");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_user_delete_is_admin_only() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;
    let victim = register_user(&client).await;

    let resp = client
        .delete(format!("{base_url}/api/usuarios/{}", victim.user_id))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_status_change_is_admin_only() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;

    let missing = uuid::Uuid::new_v4();
    let resp = client
        .patch(format!("{base_url}/api/pedidos/{missing}/estado"))
        .bearer_auth(&user.token)
        .json(&json!({ "status": "Enviado" }))
        .send()
        .await
        .expect("Failed to send status change");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
