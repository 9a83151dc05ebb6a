//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use event_store::InMemoryEventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (
    axum::Router,
    Arc<api::routes::AppState<InMemoryEventStore>>,
) {
    let store = InMemoryEventStore::new();
    let (state, _processor) = api::create_default_state(store, Duration::from_secs(30));
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates a product and returns its id.
async fn seed_product(app: &axum::Router, name: &str, stock: u32) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            serde_json::json!({
                "name": name,
                "description": "integration test product",
                "price": 500,
                "stock": stock
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["product_id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Creates a product and a shop listing for it; returns (shop_id, product_id).
async fn seed_listing(app: &axum::Router, stock: u32) -> (String, String) {
    let product_id = seed_product(app, "voucher", stock).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/shops",
            serde_json::json!({ "product_id": product_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let shop_id = body_json(response).await["shop_id"]
        .as_str()
        .unwrap()
        .to_string();

    (shop_id, product_id)
}

async fn redeem(app: &axum::Router, shop_id: &str, user_id: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/redemptions",
            serde_json::json!({ "shop_id": shop_id, "user_id": user_id }),
        ))
        .await
        .unwrap()
}

async fn product_stock(app: &axum::Router, product_id: &str) -> u64 {
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/products/{product_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["stock"].as_u64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .oneshot(empty_request("GET", "/metrics"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_get_product() {
    let (app, _) = setup();
    let product_id = seed_product(&app, "gift card", 3).await;

    let response = app
        .oneshot(empty_request("GET", &format!("/products/{product_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let product = body_json(response).await;
    assert_eq!(product["name"], "gift card");
    assert_eq!(product["price"], 500);
    assert_eq!(product["stock"], 3);
    assert_eq!(product["status"], "AVAILABLE");
}

#[tokio::test]
async fn test_create_product_validation() {
    let (app, _) = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/products",
            serde_json::json!({ "name": "", "price": 500, "stock": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "validation");
}

#[tokio::test]
async fn test_get_nonexistent_product() {
    let (app, _) = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(empty_request("GET", &format!("/products/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_patch_product() {
    let (app, _) = setup();
    let product_id = seed_product(&app, "voucher", 5).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/products/{product_id}"),
            serde_json::json!({ "price": 750, "status": "UNAVAILABLE" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let product = body_json(response).await;
    assert_eq!(product["price"], 750);
    assert_eq!(product["status"], "UNAVAILABLE");
    assert_eq!(product["stock"], 5);
}

#[tokio::test]
async fn test_patch_unknown_product_is_not_found() {
    let (app, _) = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/products/{fake_id}"),
            serde_json::json!({ "price": 750 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_listed_product_is_forbidden() {
    let (app, _) = setup();
    let (_, product_id) = seed_listing(&app, 5).await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/products/{product_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "product_in_use");

    // Still in the catalog.
    let response = app
        .oneshot(empty_request("GET", &format!("/products/{product_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_unlisted_product() {
    let (app, _) = setup();
    let product_id = seed_product(&app, "voucher", 5).await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/products/{product_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", &format!("/products/{product_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_products_reflects_mutations() {
    let (app, _) = setup();
    seed_product(&app, "apple", 5).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // A second create must invalidate the cached listing.
    seed_product(&app, "banana", 5).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/products"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(empty_request("GET", "/products?status=AVAILABLE"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_products_with_bad_status_filter() {
    let (app, _) = setup();

    let response = app
        .oneshot(empty_request("GET", "/products?status=SOLD_OUT"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_shop_for_unknown_product_is_not_found() {
    let (app, _) = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(json_request(
            "POST",
            "/shops",
            serde_json::json!({ "product_id": fake_id.to_string() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_shops() {
    let (app, _) = setup();
    let (shop_id, product_id) = seed_listing(&app, 5).await;

    let response = app
        .oneshot(empty_request("GET", "/shops"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let shops = body_json(response).await;
    assert_eq!(shops.as_array().unwrap().len(), 1);
    assert_eq!(shops[0]["shop_id"], shop_id);
    assert_eq!(shops[0]["product_id"], product_id);
}

#[tokio::test]
async fn test_redeem_happy_path() {
    let (app, _) = setup();
    let (shop_id, product_id) = seed_listing(&app, 2).await;
    let user_id = uuid::Uuid::new_v4().to_string();

    let response = redeem(&app, &shop_id, &user_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let entry = body_json(response).await;
    assert_eq!(entry["status"], "WAITING_APPROVAL");
    assert_eq!(entry["user_id"], user_id);
    let redeem_id = entry["redeem_id"].as_str().unwrap().to_string();

    assert_eq!(product_stock(&app, &product_id).await, 1);

    let response = app
        .oneshot(empty_request("GET", &format!("/redemptions/{redeem_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "WAITING_APPROVAL");
}

#[tokio::test]
async fn test_redeem_out_of_stock() {
    let (app, _) = setup();
    let (shop_id, _) = seed_listing(&app, 0).await;

    let response = redeem(&app, &shop_id, &uuid::Uuid::new_v4().to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "product_unavailable");
}

#[tokio::test]
async fn test_redeem_unknown_shop() {
    let (app, _) = setup();

    let response = redeem(
        &app,
        &uuid::Uuid::new_v4().to_string(),
        &uuid::Uuid::new_v4().to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redeem_payment_failure_restores_stock() {
    let (app, state) = setup();
    let (shop_id, product_id) = seed_listing(&app, 3).await;

    state.wallet.set_fail_on_pay(true);
    let response = redeem(&app, &shop_id, &uuid::Uuid::new_v4().to_string()).await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_json(response).await["error"], "payment_failed");
    assert_eq!(product_stock(&app, &product_id).await, 3);
}

#[tokio::test]
async fn test_cancel_redemption() {
    let (app, state) = setup();
    let (shop_id, product_id) = seed_listing(&app, 2).await;

    let response = redeem(&app, &shop_id, &uuid::Uuid::new_v4().to_string()).await;
    let redeem_id = body_json(response).await["redeem_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/redemptions/{redeem_id}/cancel"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let entry = body_json(response).await;
    assert_eq!(entry["status"], "CANCELED");
    assert_eq!(entry["reversal_pending"], false);
    assert_eq!(product_stock(&app, &product_id).await, 2);
    assert_eq!(state.wallet.outstanding_charges(), 0);

    // Canceled is terminal.
    let response = app
        .oneshot(empty_request(
            "POST",
            &format!("/redemptions/{redeem_id}/cancel"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_redeemed_entry_cannot_be_canceled() {
    let (app, _) = setup();
    let (shop_id, _) = seed_listing(&app, 2).await;

    let response = redeem(&app, &shop_id, &uuid::Uuid::new_v4().to_string()).await;
    let redeem_id = body_json(response).await["redeem_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/redemptions/{redeem_id}/status"),
            serde_json::json!({ "status": "REDEEMED" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "REDEEMED");

    let response = app
        .oneshot(empty_request(
            "POST",
            &format!("/redemptions/{redeem_id}/cancel"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "already_completed");
}

#[tokio::test]
async fn test_update_status_malformed_value() {
    let (app, _) = setup();
    let (shop_id, _) = seed_listing(&app, 2).await;

    let response = redeem(&app, &shop_id, &uuid::Uuid::new_v4().to_string()).await;
    let redeem_id = body_json(response).await["redeem_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/redemptions/{redeem_id}/status"),
            serde_json::json!({ "status": "APPROVED" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "validation");
}

#[tokio::test]
async fn test_update_status_unknown_entry() {
    let (app, _) = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/redemptions/{fake_id}/status"),
            serde_json::json!({ "status": "DECLINED" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_redemptions_with_filters() {
    let (app, _) = setup();
    let (shop_id, _) = seed_listing(&app, 5).await;
    let alice = uuid::Uuid::new_v4().to_string();
    let bob = uuid::Uuid::new_v4().to_string();

    redeem(&app, &shop_id, &alice).await;
    redeem(&app, &shop_id, &alice).await;
    redeem(&app, &shop_id, &bob).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/redemptions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/redemptions?user_id={alice}")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/redemptions?status=WAITING_APPROVAL",
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    let response = app
        .oneshot(empty_request("GET", "/redemptions?status=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_id_format() {
    let (app, _) = setup();

    let response = app
        .oneshot(empty_request("GET", "/redemptions/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
