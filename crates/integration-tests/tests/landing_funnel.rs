//! Landing page funnel: view, call to action, lead and order.

use axum::http::{Method, StatusCode};
use haat_core::{PaymentMethod, Quantity, REVIEWS_SHOWN};
use haat_integration_tests::{MockApi, fixtures};
use haat_storefront::AppError;
use haat_storefront::checkout::CheckoutForm;
use haat_storefront::error::ValidationError;
use haat_storefront::landing::LeadForm;
use rust_decimal::Decimal;
use serde_json::json;

const PAGE: &str = "/api/landing-pages/slug/summer-mango";
const LEADS: &str = "/api/landing-pages/lp1/leads";
const TRACK: &str = "/api/analytics/track";

fn campaign(api: &MockApi) {
    api.respond(Method::GET, PAGE, fixtures::landing_page("lp1", "summer-mango", "p1"))
        .respond(Method::POST, TRACK, json!({"success": true}));
}

fn lead_form() -> LeadForm {
    LeadForm {
        name: "Rahim".to_string(),
        phone: "01712 345678".to_string(),
        address: Some("Mirpur 10".to_string()),
        note: None,
    }
}

#[tokio::test]
async fn test_view_is_recorded_once_per_session() {
    let api = MockApi::start().await;
    campaign(&api);
    let client = api.client();

    let page = client.landing().open("summer-mango").await.unwrap();
    assert_eq!(page.effective_price(), Decimal::from(1200));
    assert_eq!(page.compare_at_price(), Some(Decimal::from(1500)));
    client.landing().open("summer-mango").await.unwrap();
    client.shutdown().await;

    let visits = api.requests_to(&Method::POST, TRACK);
    assert_eq!(visits.len(), 1);
    let event = &visits[0].body;
    assert_eq!(event["eventType"], "VISIT");
    assert_eq!(event["landingPageId"], "lp1");
    assert_eq!(event["productId"], "p1");
    assert_eq!(event["path"], "/lp/summer-mango");
    assert_eq!(event["sessionId"], json!(client.analytics().session_id()));
}

#[tokio::test]
async fn test_inactive_page_is_not_found() {
    let api = MockApi::start().await;
    let mut page = fixtures::landing_page("lp2", "winter-honey", "p2");
    page["isActive"] = json!(false);
    api.respond(Method::GET, "/api/landing-pages/slug/winter-honey", page)
        .respond(Method::POST, TRACK, json!({}));
    let client = api.client();

    let err = client.landing().open("winter-honey").await.unwrap_err();
    assert!(err.is_not_found());

    let missing = client.landing().open("no-such-page").await.unwrap_err();
    assert!(missing.is_not_found());

    client.shutdown().await;
    assert!(api.requests_to(&Method::POST, TRACK).is_empty());
}

#[tokio::test]
async fn test_cta_click_reports_delivery() {
    let api = MockApi::start().await;
    campaign(&api);
    let client = api.client();

    let page = client.landing().open("summer-mango").await.unwrap();
    assert!(client.landing().cta_click(&page).outcome().await);

    let clicks: Vec<_> = api
        .wait_for(&Method::POST, TRACK, 2)
        .await
        .into_iter()
        .filter(|r| r.body["eventType"] == "CTA_CLICK")
        .collect();
    assert_eq!(clicks.len(), 1);
}

#[tokio::test]
async fn test_lead_submission_records_lead_event() {
    let api = MockApi::start().await;
    campaign(&api);
    api.respond(Method::POST, LEADS, json!({"success": true}));
    let client = api.client();

    let page = client.landing().open("summer-mango").await.unwrap();
    client.landing().submit_lead(&page, &lead_form()).await.unwrap();

    let lead = &api.requests_to(&Method::POST, LEADS)[0];
    assert_eq!(lead.body["name"], "Rahim");
    assert_eq!(lead.body["phone"], "01712345678");
    assert_eq!(lead.body["address"], "Mirpur 10");
    assert_eq!(lead.body["sessionId"], json!(client.analytics().session_id()));

    let events = api.wait_for(&Method::POST, TRACK, 2).await;
    let lead_event = events
        .iter()
        .find(|r| r.body["eventType"] == "LEAD")
        .unwrap();
    assert_eq!(lead_event.body["metadata"]["source"], "lead_form");
}

#[tokio::test]
async fn test_lead_survives_analytics_outage() {
    let api = MockApi::start().await;
    // Analytics endpoint is not configured and answers 404.
    api.respond(Method::GET, PAGE, fixtures::landing_page("lp1", "summer-mango", "p1"))
        .respond(Method::POST, LEADS, json!({}));
    let client = api.client();

    let page = client.landing().open("summer-mango").await.unwrap();
    client.landing().submit_lead(&page, &lead_form()).await.unwrap();
    assert!(!client.landing().cta_click(&page).outcome().await);
    assert_eq!(api.requests_to(&Method::POST, LEADS).len(), 1);
}

#[tokio::test]
async fn test_invalid_lead_is_rejected_locally() {
    let api = MockApi::start().await;
    campaign(&api);
    api.respond_with(
        Method::POST,
        LEADS,
        StatusCode::BAD_REQUEST,
        json!({"message": "Duplicate lead"}),
    );
    let client = api.client();
    let page = client.landing().open("summer-mango").await.unwrap();

    let mut form = lead_form();
    form.phone = "555-0100".to_string();
    let err = client.landing().submit_lead(&page, &form).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::Phone(_))));
    assert!(api.requests_to(&Method::POST, LEADS).is_empty());

    let err = client
        .landing()
        .submit_lead(&page, &lead_form())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Duplicate lead"));
}

#[tokio::test]
async fn test_buy_orders_at_campaign_price() {
    let api = MockApi::start().await;
    campaign(&api);
    api.respond(
        Method::POST,
        "/api/orders/guest",
        fixtures::order("o9", 2460, 60),
    );
    let client = api.client();

    let page = client.landing().open("summer-mango").await.unwrap();
    let form = CheckoutForm {
        full_name: "Rahim Uddin".to_string(),
        phone: "01712345678".to_string(),
        address: "House 1, Road 2".to_string(),
        city: "Dhaka".to_string(),
        payment_method: PaymentMethod::Bkash,
        ..CheckoutForm::default()
    };
    let order = client
        .landing()
        .buy(&page, Quantity::new(2).unwrap(), &form)
        .await
        .unwrap();
    assert_eq!(order.id.as_str(), "o9");

    let sent = &api.requests_to(&Method::POST, "/api/orders/guest")[0];
    assert_eq!(sent.body["items"][0]["price"], 1200);
    assert_eq!(sent.body["items"][0]["quantity"], 2);
    assert_eq!(sent.body["landingPage"], "lp1");
    assert_eq!(sent.body["deliveryCharge"], 60);
    assert_eq!(sent.body["totalAmount"], 2460);
    assert_eq!(sent.body["paymentMethod"], "bkash");

    let events = api.wait_for(&Method::POST, TRACK, 2).await;
    let lead_event = events
        .iter()
        .find(|r| r.body["eventType"] == "LEAD")
        .unwrap();
    assert_eq!(lead_event.body["metadata"]["source"], "order");
    assert_eq!(lead_event.body["metadata"]["orderId"], "o9");
}

#[tokio::test]
async fn test_reviews_fall_back_to_builtin_pool_in_fixed_order() {
    let api = MockApi::start().await;
    campaign(&api);
    let client = api.client();

    let page = client.landing().open("summer-mango").await.unwrap();
    let first = client.landing().reviews(&page);
    assert_eq!(first.len(), REVIEWS_SHOWN);
    assert_eq!(first, client.landing().reviews(&page));
}
