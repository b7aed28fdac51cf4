//! Integration tests for profiles and addresses.
//!
//! Run with: cargo test -p cerveceria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use cerveceria_integration_tests::{add_address, base_url, client, register_user};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_profile_changes_password() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;

    let resp = client
        .patch(format!("{base_url}/api/usuarios/{}", user.user_id))
        .bearer_auth(&user.token)
        .json(&json!({ "name": "Nuevo Nombre", "password": "otra-contraseña-123" }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(profile["name"], json!("Nuevo Nombre"));

    // The old password stops working, the new one logs in
    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": user.email, "password": "contraseña-segura" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": user.email, "password": "otra-contraseña-123" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_weak_new_password_rejected() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;

    let resp = client
        .patch(format!("{base_url}/api/usuarios/{}", user.user_id))
        .bearer_auth(&user.token)
        .json(&json!({ "password": "corta" }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_and_remove_address() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;
    let address_id = add_address(&client, &user).await;

    let resp = client
        .delete(format!(
            "{base_url}/api/usuarios/{}/direcciones/{address_id}",
            user.user_id
        ))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!(
            "{base_url}/api/usuarios/{}/direcciones",
            user.user_id
        ))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to list addresses");
    assert_eq!(resp.status(), StatusCode::OK);
    let addresses: Vec<Value> = resp.json().await.expect("Failed to parse addresses");
    assert!(addresses.iter().all(|a| a["id"] != json!(address_id)));

    // Deleting it again is a 404
    let resp = client
        .delete(format!(
            "{base_url}/api/usuarios/{}/direcciones/{address_id}",
            user.user_id
        ))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cannot_remove_another_users_address() {
    let client = client();
    let base_url = base_url();
    let owner = register_user(&client).await;
    let intruder = register_user(&client).await;
    let address_id = add_address(&client, &owner).await;

    let resp = client
        .delete(format!(
            "{base_url}/api/usuarios/{}/direcciones/{address_id}",
            owner.user_id
        ))
        .bearer_auth(&intruder.token)
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
