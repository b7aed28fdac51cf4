//! Integration tests for the public product catalog.
//!
//! Requires a running API server and a seeded catalog (`cerveceria seed`).
//!
//! Run with: cargo test -p cerveceria-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use cerveceria_integration_tests::{any_product_id, base_url, client};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_list_products_public() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/productos"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse product list");
    assert!(!products.is_empty());

    for product in &products {
        assert!(product["id"].as_str().is_some());
        assert!(product["name"].as_str().is_some());
        assert!(product["price"].as_i64().is_some());
        assert_eq!(product["active"], Value::Bool(true));
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_list_products_filtered_by_style() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/productos?tipo=IPA"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse product list");
    for product in &products {
        assert_eq!(product["style"], Value::String("IPA".to_string()));
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_list_products_filtered_by_price_and_abv() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!(
            "{base_url}/api/productos?precioMin=1000&precioMax=5000&abvMin=3.0&abvMax=9.0"
        ))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse product list");
    for product in &products {
        let price = product["price"].as_i64().expect("price");
        assert!((1000..=5000).contains(&price));
        let abv = product["abv"].as_f64().expect("abv");
        assert!((3.0..=9.0).contains(&abv));
    }

    // A floor above every catalog price yields an empty list
    let resp = client
        .get(format!("{base_url}/api/productos?precioMin=99999999"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse product list");
    assert!(products.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_products() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/productos/buscar?q=ipa"))
        .send()
        .await
        .expect("Failed to search products");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_detail_and_missing() {
    let client = client();
    let base_url = base_url();
    let product_id = any_product_id(&client).await;

    let resp = client
        .get(format!("{base_url}/api/productos/{product_id}"))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::OK);

    let missing = uuid::Uuid::new_v4();
    let resp = client
        .get(format!("{base_url}/api/productos/{missing}"))
        .send()
        .await
        .expect("Failed to get missing product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["statusCode"], serde_json::json!(404));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_write_requires_admin() {
    let client = client();
    let base_url = base_url();
    let user = cerveceria_integration_tests::register_user(&client).await;

    // Anonymous
    let resp = client
        .post(format!("{base_url}/api/productos"))
        .json(&serde_json::json!({
            "name": "No debería crearse",
            "description": "x",
            "price": 1000,
            "stock": 1,
            "style": "Lager",
            "abv": 4.0,
            "ibu": 10,
            "format": "Lata 473ml"
        }))
        .send()
        .await
        .expect("Failed to send create");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but not admin
    let resp = client
        .post(format!("{base_url}/api/productos"))
        .bearer_auth(&user.token)
        .json(&serde_json::json!({
            "name": "Tampoco",
            "description": "x",
            "price": 1000,
            "stock": 1,
            "style": "Lager",
            "abv": 4.0,
            "ibu": 10,
            "format": "Lata 473ml"
        }))
        .send()
        .await
        .expect("Failed to send create");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
