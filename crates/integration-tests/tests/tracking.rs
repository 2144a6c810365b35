//! Public order tracking.

use axum::http::Method;
use haat_core::{OrderId, OrderStatus};
use haat_integration_tests::{MockApi, fixtures};
use haat_storefront::AppError;
use haat_storefront::api::ApiError;
use haat_storefront::error::ValidationError;
use haat_storefront::tracking::tracking_url;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_track_sanitizes_input_and_needs_no_token() {
    let api = MockApi::start().await;
    let mut order = fixtures::order("65f0c9a1", 1070, 70);
    order["status"] = json!("shipped");
    api.respond(Method::GET, "/api/orders/track/65f0c9a1", json!({"order": order}));
    let client = api.client();

    let order = client.tracker().track("  #65f0c9a1 ").await.unwrap();
    assert_eq!(order.id.as_str(), "65f0c9a1");
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.total_amount, Decimal::from(1070));
    assert_eq!(order.unit_count(), 1);

    let sent = &api.requests_to(&Method::GET, "/api/orders/track/65f0c9a1")[0];
    assert_eq!(sent.authorization, None);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let api = MockApi::start().await;
    let client = api.client();

    let err = client.tracker().track("deadbeef").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_server_error());
}

#[tokio::test]
async fn test_malformed_ids_are_rejected_before_any_request() {
    let api = MockApi::start().await;
    let client = api.client();

    for input in ["", "  # ", "abc/def", "ab cd"] {
        let err = client.tracker().track(input).await.unwrap_err();
        assert!(
            matches!(err, AppError::Validation(ValidationError::OrderId(_))),
            "{input:?} gave {err}"
        );
    }
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let api = MockApi::start().await;
    api.rate_limit(Method::GET, "/api/orders/track/o1", 30);
    let client = api.client();

    let err = client.tracker().track("o1").await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::RateLimited(30))));
}

#[tokio::test]
async fn test_tracking_url_points_at_site() {
    let api = MockApi::start().await;
    let mut config = api.config();
    config.site_url = "https://haat.example.com/shop/".parse().unwrap();

    let url = tracking_url(&config.site_url, &OrderId::new("o1"));
    assert_eq!(url.as_str(), "https://haat.example.com/shop/track-order?id=o1");
}
