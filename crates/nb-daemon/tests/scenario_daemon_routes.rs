//! In-process scenario tests for nb-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot` — no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

use nb_cart::CommerceBackend;
use nb_daemon::{routes, state};
use nb_storefront_mock::{sample_product, MockShop};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a fresh AppState backed by a seeded mock shop.
fn make_state() -> (Arc<state::AppState>, Arc<MockShop>) {
    let shop = Arc::new(MockShop::new("EUR"));
    shop.seed_product(sample_product("noabea-body-cream", "var-1", "24.95"));
    shop.seed_product(sample_product("other-product", "var-2", "12.5"));

    let backend: Arc<dyn state::ShopBackend> = shop.clone();
    let initial = shop.fetch_cart().expect("mock cart");
    let st = Arc::new(state::AppState::new(
        backend,
        "noabea-body-cream".to_string(),
        initial,
    ));
    (st, shop)
}

fn make_router() -> axum::Router {
    let (st, _shop) = make_state();
    routes::build_router(st)
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let (status, body) = call(make_router(), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "nb-daemon");
}

// ---------------------------------------------------------------------------
// GET /v1/cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cart_starts_empty() {
    let (status, body) = call(make_router(), get("/v1/cart")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["cart"]["total_quantity"], 0);
    assert!(json["cart"]["lines"].as_array().unwrap().is_empty());
    assert!(json["controls"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// GET /v1/product
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_defaults_to_featured_handle() {
    let (status, body) = call(make_router(), get("/v1/product")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["product"]["handle"], "noabea-body-cream");
}

#[tokio::test]
async fn product_lookup_by_explicit_handle() {
    let (status, body) = call(make_router(), get("/v1/product?handle=other-product")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["product"]["handle"], "other-product");
}

#[tokio::test]
async fn unknown_handle_falls_back_to_first_product() {
    let (status, body) = call(make_router(), get("/v1/product?handle=does-not-exist")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse_json(body)["product"]["handle"],
        "noabea-body-cream",
        "unknown handle must fall back to the first available product"
    );
}

#[tokio::test]
async fn empty_shop_returns_404() {
    let shop = Arc::new(MockShop::new("EUR"));
    let backend: Arc<dyn state::ShopBackend> = shop.clone();
    let initial = shop.fetch_cart().unwrap();
    let st = Arc::new(state::AppState::new(
        backend,
        "noabea-body-cream".to_string(),
        initial,
    ));

    let (status, body) = call(routes::build_router(st), get("/v1/product")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["error"], "no products found");
}

// ---------------------------------------------------------------------------
// Unknown routes return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (status, _) = call(make_router(), get("/v1/does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
