//! Order placement from the cart, buy-now and the submission guard.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use haat_core::{PaymentMethod, ProductId, Quantity};
use haat_integration_tests::{MockApi, fixtures};
use haat_storefront::AppError;
use haat_storefront::api::ApiError;
use haat_storefront::checkout::{
    CheckoutForm, CheckoutSource, SourceKind, Submission, SubmissionState,
};
use haat_storefront::error::{CheckoutError, ValidationError};
use haat_storefront::storage::{MemoryStorage, Storage, keys};
use rust_decimal::Decimal;
use serde_json::json;

fn form(city: &str) -> CheckoutForm {
    CheckoutForm {
        full_name: "Rahim Uddin".to_string(),
        phone: "+880 1712-345678".to_string(),
        address: "House 1, Road 2".to_string(),
        city: city.to_string(),
        note: Some("Call before delivery".to_string()),
        payment_method: PaymentMethod::Cod,
        delivery_area: None,
    }
}

fn buy_now(id: &str, quantity: u32) -> CheckoutSource {
    CheckoutSource::BuyNow {
        product_id: ProductId::new(id),
        quantity: Quantity::new(quantity).unwrap(),
    }
}

#[tokio::test]
async fn test_guest_cart_checkout() {
    let api = MockApi::start().await;
    api.respond(Method::GET, "/api/products/p1", fixtures::product("p1", "Mango", 500))
        .respond(
            Method::GET,
            "/api/settings",
            json!({"deliveryChargeInside": 70, "deliveryChargeOutside": 130}),
        )
        .respond(
            Method::POST,
            "/api/orders/guest",
            json!({"order": fixtures::order("o1", 1070, 70)}),
        );
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let client = api.client_with(api.config(), Arc::clone(&storage));

    let mango = client.api().product(&ProductId::new("p1")).await.unwrap();
    client
        .cart()
        .add_to_cart(&mango, Quantity::new(2).unwrap())
        .await
        .unwrap();

    let summary = client.checkout().prepare(CheckoutSource::Cart).await.unwrap();
    assert_eq!(summary.source, SourceKind::Cart);
    assert_eq!(summary.subtotal, Decimal::from(1000));

    let order = client
        .checkout()
        .place_order(&summary, &form("Mirpur, Dhaka"))
        .await
        .unwrap();
    assert_eq!(order.id.as_str(), "o1");

    let sent = &api.requests_to(&Method::POST, "/api/orders/guest")[0];
    assert_eq!(sent.authorization, None);
    assert_eq!(sent.body["items"][0]["product"], "p1");
    assert_eq!(sent.body["items"][0]["quantity"], 2);
    assert_eq!(sent.body["deliveryCharge"], 70);
    assert_eq!(sent.body["totalAmount"], 1070);
    assert_eq!(sent.body["paymentMethod"], "cod");
    assert_eq!(sent.body["shippingAddress"]["phone"], "01712345678");
    assert_eq!(sent.body["sessionId"], json!(client.analytics().session_id()));
    assert!(sent.body.get("landingPage").is_none());

    // A placed cart order empties the cart.
    assert_eq!(client.cart().count().await, 0);
    assert_eq!(storage.get(keys::GUEST_CART).unwrap(), None);
}

#[tokio::test]
async fn test_signed_in_buy_now_uses_account_endpoint() {
    let api = MockApi::start().await;
    api.respond(Method::GET, "/api/products/p1", fixtures::product("p1", "Mango", 500))
        .respond(Method::POST, "/api/auth/login", fixtures::user())
        .respond(
            Method::GET,
            "/api/cart",
            json!({"items": [fixtures::server_line("p2", "Honey", 450, 1)]}),
        )
        .respond(Method::POST, "/api/orders", fixtures::order("o2", 620, 120));

    let client = api.client();
    client.login("rahim@example.com", "secret").await.unwrap();

    let summary = client.checkout().prepare(buy_now("p1", 1)).await.unwrap();
    let order = client
        .checkout()
        .place_order(&summary, &form("Sylhet"))
        .await
        .unwrap();
    assert_eq!(order.id.as_str(), "o2");

    let sent = &api.requests_to(&Method::POST, "/api/orders")[0];
    assert_eq!(
        sent.authorization.as_deref(),
        Some(format!("Bearer {}", fixtures::TOKEN).as_str())
    );
    // No settings endpoint: the default outside-Dhaka charge applies.
    assert_eq!(sent.body["deliveryCharge"], 120);
    assert_eq!(sent.body["totalAmount"], 620);
    assert!(api.requests_to(&Method::POST, "/api/orders/guest").is_empty());

    // Buy-now leaves the cart alone.
    assert_eq!(client.cart().count().await, 1);
    assert!(api.requests_to(&Method::DELETE, "/api/cart").is_empty());
}

#[tokio::test]
async fn test_rejected_token_is_not_retried_as_guest() {
    let api = MockApi::start().await;
    api.respond(Method::GET, "/api/products/p1", fixtures::product("p1", "Mango", 500))
        .respond(Method::POST, "/api/auth/login", fixtures::user())
        .respond(Method::GET, "/api/cart", json!({"items": []}))
        .respond_with(
            Method::POST,
            "/api/orders",
            StatusCode::UNAUTHORIZED,
            json!({"message": "Token expired"}),
        );

    let client = api.client();
    client.login("rahim@example.com", "secret").await.unwrap();

    let summary = client.checkout().prepare(buy_now("p1", 1)).await.unwrap();
    let err = client
        .checkout()
        .place_order(&summary, &form("Dhaka"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Api(ApiError::Unauthorized(ref m)) if m == "Token expired"));
    assert!(api.requests_to(&Method::POST, "/api/orders/guest").is_empty());
}

#[tokio::test]
async fn test_empty_cart_and_bad_form_send_nothing() {
    let api = MockApi::start().await;
    api.respond(Method::GET, "/api/products/p1", fixtures::product("p1", "Mango", 500));
    let client = api.client();

    let empty = client.checkout().prepare(CheckoutSource::Cart).await.unwrap();
    let err = client
        .checkout()
        .place_order(&empty, &form("Dhaka"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::EmptyOrder)));

    let summary = client.checkout().prepare(buy_now("p1", 1)).await.unwrap();
    let mut bad = form("Dhaka");
    bad.phone = "12345".to_string();
    let err = client
        .checkout()
        .place_order(&summary, &bad)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::Phone(_))));

    assert!(api.requests_to(&Method::POST, "/api/orders/guest").is_empty());
}

#[tokio::test]
async fn test_submission_cannot_be_placed_twice() {
    let api = MockApi::start().await;
    api.respond(Method::GET, "/api/products/p1", fixtures::product("p1", "Mango", 500))
        .respond(Method::POST, "/api/orders/guest", fixtures::order("o3", 560, 60));
    let client = api.client();

    let summary = client.checkout().prepare(buy_now("p1", 1)).await.unwrap();
    let mut submission = Submission::new();

    client
        .checkout()
        .submit(&mut submission, &summary, &form("Dhaka"))
        .await
        .unwrap();
    assert!(matches!(submission.state(), SubmissionState::Succeeded(o) if o.id.as_str() == "o3"));

    let again = client
        .checkout()
        .submit(&mut submission, &summary, &form("Dhaka"))
        .await
        .unwrap_err();
    assert!(matches!(again, AppError::Checkout(CheckoutError::AlreadyPlaced)));
    assert_eq!(api.requests_to(&Method::POST, "/api/orders/guest").len(), 1);
}

#[tokio::test]
async fn test_failed_submission_can_be_retried() {
    let api = MockApi::start().await;
    api.respond(Method::GET, "/api/products/p1", fixtures::product("p1", "Mango", 500))
        .respond_with(
            Method::POST,
            "/api/orders/guest",
            StatusCode::BAD_REQUEST,
            json!({"message": "Phone number is blocked"}),
        );
    let client = api.client();

    let summary = client.checkout().prepare(buy_now("p1", 1)).await.unwrap();
    let mut submission = Submission::new();
    let err = client
        .checkout()
        .submit(&mut submission, &summary, &form("Dhaka"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Phone number is blocked"));
    assert!(matches!(submission.state(), SubmissionState::Failed(_)));

    api.respond(Method::POST, "/api/orders/guest", fixtures::order("o4", 560, 60));
    let order = client
        .checkout()
        .submit(&mut submission, &summary, &form("Dhaka"))
        .await
        .unwrap();
    assert_eq!(order.id.as_str(), "o4");
}
