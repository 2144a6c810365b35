//! Integration tests for Haat.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p haat-integration-tests
//! ```
//!
//! No backend is needed. [`MockApi`] serves canned JSON on an ephemeral
//! port and records every request the client makes, so tests can assert on
//! both what the client did with a response and what it sent.
//!
//! # Test Categories
//!
//! - `cart_flow` - guest cart persistence, server cart, sign-in policies
//! - `checkout_flow` - cart, buy-now and guest/account order placement
//! - `landing_funnel` - landing page views, leads, orders and analytics
//! - `catalog` - product listings, query parameters and caching
//! - `tracking` - public order lookup

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use haat_storefront::AppState;
use haat_storefront::config::StorefrontConfig;
use haat_storefront::storage::{MemoryStorage, Storage};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

// =============================================================================
// Recorded Requests
// =============================================================================

/// One request the client sent to the fake API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedRequest {
    /// Value of a query parameter, if present.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_owned())
        })
    }
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: Value,
    retry_after: Option<u64>,
}

#[derive(Default)]
struct Routes {
    replies: HashMap<(Method, String), Reply>,
    queued: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<Routes>>;

// =============================================================================
// MockApi
// =============================================================================

/// A fake REST backend.
///
/// Unconfigured routes answer `404 {"message": "Not found"}`.
/// Replies queued with [`MockApi::respond_once`] take precedence.
pub struct MockApi {
    addr: SocketAddr,
    routes: Shared,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start the server on an ephemeral port.
    pub async fn start() -> Self {
        let routes: Shared = Arc::default();
        let app = Router::new().fallback(handle).with_state(Arc::clone(&routes));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            routes,
            server,
        }
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `method path` with `200` and `body`.
    pub fn respond(&self, method: Method, path: &str, body: Value) -> &Self {
        self.respond_with(method, path, StatusCode::OK, body)
    }

    /// Answer `method path` with `status` and `body`.
    pub fn respond_with(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.insert(method, path, Reply {
            status,
            body,
            retry_after: None,
        });
        self
    }

    /// Answer `method path` with `429` and a `Retry-After` header.
    pub fn rate_limit(&self, method: Method, path: &str, retry_after: u64) -> &Self {
        self.insert(method, path, Reply {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: json!({"message": "Too many requests"}),
            retry_after: Some(retry_after),
        });
        self
    }

    /// Answer the next unanswered `method path` with `status` and `body`,
    /// once. Queued replies go out in order before the standing reply.
    pub fn respond_once(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.lock()
            .queued
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(Reply {
                status,
                body,
                retry_after: None,
            });
        self
    }

    fn insert(&self, method: Method, path: &str, reply: Reply) {
        self.lock().replies.insert((method, path.to_owned()), reply);
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// Wait until `count` requests for `method path` have arrived.
    ///
    /// Analytics events are sent from background tasks, so tests poll.
    pub async fn wait_for(&self, method: &Method, path: &str, count: usize) -> Vec<RecordedRequest> {
        for _ in 0..200 {
            let seen = self.requests_to(method, path);
            if seen.len() >= count {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} x {method} {path}");
    }

    /// Client config pointing at this server.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_api(&self.url()).unwrap()
    }

    /// A client over fresh in-memory storage.
    #[must_use]
    pub fn client(&self) -> AppState {
        self.client_with(self.config(), Arc::new(MemoryStorage::new()))
    }

    /// A client over the given persistent storage, as if restarted on it.
    #[must_use]
    pub fn client_with(&self, config: StorefrontConfig, persistent: Arc<dyn Storage>) -> AppState {
        AppState::with_storage(config, persistent, Arc::new(MemoryStorage::new())).unwrap()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(routes): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let reply = {
        let mut routes = routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_owned),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });
        let key = (method, path);
        let once = routes.queued.get_mut(&key).and_then(VecDeque::pop_front);
        once.or_else(|| routes.replies.get(&key).cloned())
    };

    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, axum::Json(json!({"message": "Not found"}))).into_response();
    };

    let mut response = (reply.status, axum::Json(reply.body)).into_response();
    if let Some(seconds) = reply.retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
    }
    response
}

// =============================================================================
// Fixtures
// =============================================================================

/// Backend documents in the shapes the API returns.
pub mod fixtures {
    use serde_json::{Value, json};

    /// Token handed out by [`user`].
    pub const TOKEN: &str = "tok-rahim";

    #[must_use]
    pub fn product(id: &str, name: &str, price: u32) -> Value {
        json!({
            "_id": id,
            "name": name,
            "basePrice": price,
            "images": [format!("https://cdn.example.com/{id}.jpg")],
            "stock": 25,
            "isActive": true
        })
    }

    /// A signed-in user with [`TOKEN`].
    #[must_use]
    pub fn user() -> Value {
        json!({
            "_id": "u1",
            "name": "Rahim Uddin",
            "email": "rahim@example.com",
            "role": "user",
            "token": TOKEN
        })
    }

    /// A server cart line with a populated product.
    #[must_use]
    pub fn server_line(id: &str, name: &str, price: u32, quantity: u32) -> Value {
        json!({"product": product(id, name, price), "quantity": quantity})
    }

    #[must_use]
    pub fn order(id: &str, total: u32, delivery: u32) -> Value {
        json!({
            "_id": id,
            "items": [{"product": "p1", "name": "Mango", "price": total - delivery, "quantity": 1}],
            "shippingAddress": {
                "fullName": "Rahim Uddin",
                "phone": "01712345678",
                "address": "House 1, Road 2",
                "city": "Dhaka"
            },
            "deliveryCharge": delivery,
            "paymentMethod": "cod",
            "totalAmount": total,
            "status": "pending",
            "createdAt": "2026-05-01T10:00:00Z"
        })
    }

    #[must_use]
    pub fn landing_page(id: &str, slug: &str, product_id: &str) -> Value {
        json!({
            "_id": id,
            "slug": slug,
            "title": "Rajshahi Mango Festival",
            "headline": "Fresh Himsagar, straight from the orchard",
            "product": product(product_id, "Himsagar Mango 5kg", 1500),
            "regularPrice": 1500,
            "offerPrice": 1200,
            "features": ["Chemical free", {"title": "Next-day delivery"}],
            "isActive": true
        })
    }
}
