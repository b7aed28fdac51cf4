//! Integration tests for the cart and checkout flow.
//!
//! Requires a running API server in mock payment mode (no FLOW_API_KEY)
//! and a seeded catalog.
//!
//! Run with: cargo test -p cerveceria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use cerveceria_integration_tests::{add_address, any_product_id, base_url, client, register_user};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_add_update_remove() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;
    let product_id = any_product_id(&client).await;

    // Empty cart to start
    let resp = client
        .get(format!("{base_url}/api/carrito"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(0));

    // Add two units of one product: itemCount counts lines, not units
    let resp = client
        .post(format!("{base_url}/api/carrito/items"))
        .bearer_auth(&user.token)
        .json(&json!({ "productId": product_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add item");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(1));
    assert_eq!(cart["items"][0]["quantity"], json!(2));
    // total = subtotal + iva, both derived from line subtotals
    let subtotal = cart["subtotal"].as_i64().expect("subtotal");
    let iva = cart["iva"].as_i64().expect("iva");
    assert_eq!(cart["total"].as_i64(), Some(subtotal + iva));

    // Set the line quantity
    let resp = client
        .put(format!("{base_url}/api/carrito/items/{product_id}"))
        .bearer_auth(&user.token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("Failed to set quantity");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(1));
    assert_eq!(cart["items"][0]["quantity"], json!(1));

    // Setting the quantity to zero removes the line
    let resp = client
        .put(format!("{base_url}/api/carrito/items/{product_id}"))
        .bearer_auth(&user.token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to set quantity");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(0));

    // Re-add and remove the line explicitly
    let resp = client
        .post(format!("{base_url}/api/carrito/items"))
        .bearer_auth(&user.token)
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .delete(format!("{base_url}/api/carrito/items/{product_id}"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to remove item");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(0));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_empty_cart_rejected() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;
    let address_id = add_address(&client, &user).await;

    let resp = client
        .post(format!("{base_url}/api/pedidos"))
        .bearer_auth(&user.token)
        .json(&json!({ "addressId": address_id }))
        .send()
        .await
        .expect("Failed to send checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and mock payment mode"]
async fn test_checkout_and_mock_payment() {
    let client = client();
    let base_url = base_url();
    let user = register_user(&client).await;
    let address_id = add_address(&client, &user).await;
    let product_id = any_product_id(&client).await;

    // Fill the cart
    let resp = client
        .post(format!("{base_url}/api/carrito/items"))
        .bearer_auth(&user.token)
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    let cart_subtotal = cart["subtotal"].as_i64().expect("cart subtotal");
    let cart_unit_price = cart["items"][0]["unitPrice"].as_i64().expect("unit price");

    // Checkout
    let resp = client
        .post(format!("{base_url}/api/pedidos"))
        .bearer_auth(&user.token)
        .json(&json!({ "addressId": address_id }))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["id"].as_str().expect("order id").to_owned();
    assert_eq!(order["status"], json!("Procesando"));
    assert!(
        order["orderNumber"]
            .as_str()
            .is_some_and(|n| n.starts_with("ORD-"))
    );
    // Order lines carry the prices snapshotted on the cart
    assert_eq!(order["subtotal"].as_i64(), Some(cart_subtotal));
    assert_eq!(order["items"][0]["unitPrice"].as_i64(), Some(cart_unit_price));

    // Checkout clears the cart
    let resp = client
        .get(format!("{base_url}/api/carrito"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to get cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["itemCount"], json!(0));

    // Create the Flow payment session (mock mode)
    let resp = client
        .post(format!("{base_url}/api/pagos/flow/crear"))
        .bearer_auth(&user.token)
        .json(&json!({ "orderId": order_id }))
        .send()
        .await
        .expect("Failed to create payment");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let session: Value = resp.json().await.expect("Failed to parse session");
    assert_eq!(session["success"], json!(true));
    assert!(session["paymentId"].as_str().is_some());
    assert!(session["flowUrl"].as_str().is_some());
    assert!(
        session["token"]
            .as_str()
            .is_some_and(|t| t.starts_with("MOCK-"))
    );

    // Settle without the gateway
    let resp = client
        .post(format!("{base_url}/api/pagos/simular"))
        .bearer_auth(&user.token)
        .json(&json!({ "orderId": order_id }))
        .send()
        .await
        .expect("Failed to simulate payment");
    assert_eq!(resp.status(), StatusCode::OK);
    let payment: Value = resp.json().await.expect("Failed to parse payment");
    assert_eq!(payment["status"], json!("Pagado"));

    // The order moves to Confirmado
    let resp = client
        .get(format!("{base_url}/api/pedidos/{order_id}"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::OK);
    let order: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(order["status"], json!("Confirmado"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_access_is_owner_scoped() {
    let client = client();
    let base_url = base_url();
    let owner = register_user(&client).await;
    let intruder = register_user(&client).await;
    let address_id = add_address(&client, &owner).await;
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{base_url}/api/carrito/items"))
        .bearer_auth(&owner.token)
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add item");

    let resp = client
        .post(format!("{base_url}/api/pedidos"))
        .bearer_auth(&owner.token)
        .json(&json!({ "addressId": address_id }))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["id"].as_str().expect("order id").to_owned();

    let resp = client
        .get(format!("{base_url}/api/pedidos/{order_id}"))
        .bearer_auth(&intruder.token)
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
