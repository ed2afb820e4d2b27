//! REST API tests driven through the router without a socket

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use delivery_estimator::api::{create_router, AppState};
use delivery_estimator::models::RateLimitConfig;
use delivery_estimator::{
    DeliveryEstimator, ErrorCode, GeoPoint, MemoryStore, PricingConfig, StaticGeocoder,
    TelemetryCollector,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const PIZZERIA: &str = "Piazza del Colosseo 1, Roma";
const CUSTOMER: &str = "Piazza di San Giovanni 4, Roma";

fn geocoder() -> StaticGeocoder {
    StaticGeocoder::new()
        .with_point(PIZZERIA, GeoPoint::new(41.9028, 12.4964))
        .with_point(CUSTOMER, GeoPoint::new(41.8919, 12.5113))
        .with_failure("Via Rotta 13, Roma", ErrorCode::GeocodeUpstream)
}

fn app_with(geocoder: StaticGeocoder, rate_limit: RateLimitConfig) -> Router {
    let estimator = DeliveryEstimator::new(Arc::new(geocoder), PricingConfig::default())
        .with_lookup_timeout(Duration::from_secs(1));
    let state = Arc::new(AppState::new(
        estimator,
        Arc::new(MemoryStore::new()),
        Arc::new(TelemetryCollector::new()),
        rate_limit,
    ));
    create_router(state)
}

fn app() -> Router {
    app_with(geocoder(), RateLimitConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_pizzeria(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/restaurants",
        Some(json!({"name": "Da Mario", "address": PIZZERIA})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

fn order_body(delivery_address: &str) -> Value {
    json!({
        "customerName": "Anna",
        "deliveryAddress": delivery_address,
        "items": [
            {"name": "Margherita", "quantity": 2, "unitPrice": 7.5},
            {"name": "Tiramisu", "quantity": 1, "unitPrice": 5.0}
        ]
    })
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_estimate_endpoint() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/delivery/estimate",
        Some(json!({"restaurantAddress": PIZZERIA, "deliveryAddress": CUSTOMER, "preparationCount": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fee"], 1.0);
    assert_eq!(body["data"]["minutes"], 33.0);
    assert_eq!(body["data"]["roundedKm"], 2.0);
}

#[tokio::test]
async fn test_estimate_rejects_blank_address() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/delivery/estimate",
        Some(json!({"restaurantAddress": PIZZERIA, "deliveryAddress": "  "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_estimate_hides_geocoder_failure() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/delivery/estimate",
        Some(json!({"restaurantAddress": PIZZERIA, "deliveryAddress": "Via Rotta 13, Roma"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "GEOCODE_UPSTREAM");
    assert_eq!(body["error"]["message"], "Delivery estimate unavailable");

    let (_, stats) = send(&app, Method::GET, "/v1/stats", None).await;
    assert_eq!(stats["data"]["estimates_failed"], 1);
    assert_eq!(stats["data"]["failures_by_code"]["GEOCODE_UPSTREAM"], 1);
}

#[tokio::test]
async fn test_batch_estimate() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/delivery/estimate/batch",
        Some(json!({
            "items": [
                {"restaurantAddress": PIZZERIA, "deliveryAddress": CUSTOMER, "preparationCount": 2},
                {"restaurantAddress": PIZZERIA, "deliveryAddress": "Nowhere 0"}
            ],
            "concurrency": 2
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["succeeded"], 1);
    assert_eq!(data["results"][0]["data"]["minutes"], 43.0);
    assert_eq!(data["results"][1]["error"]["code"], "GEOCODE_NOT_FOUND");

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/delivery/estimate/batch",
        Some(json!({"items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_carries_estimate() {
    let app = app();
    let restaurant_id = create_pizzeria(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/v1/restaurants/{}/orders", restaurant_id),
        Some(order_body(CUSTOMER)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let order = &body["data"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["itemsTotal"], 20.0);
    assert_eq!(order["deliveryFee"], 1.0);
    assert_eq!(order["grandTotal"], 21.0);
    assert_eq!(order["expectedMinutes"], 33.0);

    let order_id = order["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/v1/orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["id"], order["id"]);
}

#[tokio::test]
async fn test_orders_in_preparation_slow_down_new_orders() {
    let app = app();
    let restaurant_id = create_pizzeria(&app).await;
    let orders_uri = format!("/v1/restaurants/{}/orders", restaurant_id);

    let (_, first) = send(&app, Method::POST, &orders_uri, Some(order_body(CUSTOMER))).await;
    let first_id = first["data"]["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/v1/orders/{}/status", first_id),
        Some(json!({"status": "preparation"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "preparation");

    let (status, second) = send(&app, Method::POST, &orders_uri, Some(order_body(CUSTOMER))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["data"]["expectedMinutes"], 38.0);

    let (_, list) = send(&app, Method::GET, &orders_uri, None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 2);
    assert_eq!(list["data"][0]["id"], first_id.as_str());
}

#[tokio::test]
async fn test_failed_estimate_stores_nothing() {
    let app = app();
    let restaurant_id = create_pizzeria(&app).await;
    let orders_uri = format!("/v1/restaurants/{}/orders", restaurant_id);

    let (status, body) = send(&app, Method::POST, &orders_uri, Some(order_body("Via Rotta 13, Roma"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["message"], "Delivery estimate unavailable");

    let (_, list) = send(&app, Method::GET, &orders_uri, None).await;
    assert!(list["data"].as_array().unwrap().is_empty());

    let (_, stats) = send(&app, Method::GET, "/v1/stats", None).await;
    assert_eq!(stats["data"]["orders_rejected"], 1);
    assert_eq!(stats["data"]["orders_created"], 0);
}

#[tokio::test]
async fn test_order_errors() {
    let app = app();

    let missing = format!("/v1/restaurants/{}/orders", uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::POST, &missing, Some(order_body(CUSTOMER))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "API_NOT_FOUND");

    let restaurant_id = create_pizzeria(&app).await;
    let orders_uri = format!("/v1/restaurants/{}/orders", restaurant_id);

    let (status, _) = send(
        &app,
        Method::POST,
        &orders_uri,
        Some(json!({"customerName": "Anna", "deliveryAddress": CUSTOMER, "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, created) = send(&app, Method::POST, &orders_uri, Some(order_body(CUSTOMER))).await;
    let order_id = created["data"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/v1/orders/{}/status", order_id),
        Some(json!({"status": "delivered"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "API_CONFLICT");
}

#[tokio::test]
async fn test_rate_limit() {
    let app = app_with(
        geocoder(),
        RateLimitConfig {
            requests_per_window: 1,
            window_duration: Duration::from_secs(60),
        },
    );

    let (status, _) = send(&app, Method::GET, "/v1/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/v1/stats", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "API_RATE_LIMITED");

    // Health checks bypass the limiter
    let (status, _) = send(&app, Method::GET, "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_dropped_batch_request_cancels_lookups() {
    let slow = StaticGeocoder::new()
        .with_point("Slow Kitchen 1", GeoPoint::new(41.9028, 12.4964))
        .with_point("Slow Door 2", GeoPoint::new(41.8919, 12.5113))
        .with_delay("Slow Kitchen 1", Duration::from_millis(300))
        .with_delay("Slow Door 2", Duration::from_millis(300));
    let app = app_with(slow.clone(), RateLimitConfig::default());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/delivery/estimate/batch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"items": [{"restaurantAddress": "Slow Kitchen 1", "deliveryAddress": "Slow Door 2"}]})
                .to_string(),
        ))
        .unwrap();

    // Client gives up before the lookups answer
    let outcome = tokio::time::timeout(Duration::from_millis(100), app.oneshot(request)).await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(slow.calls(), 2);
    assert_eq!(slow.completed(), 0);
}
