//! Full mutation round-trips through the HTTP surface.
//!
//! GREEN when:
//! - add → applied, the line appears with its controls enabled;
//! - every mutation broadcasts an optimistic snapshot on the bus BEFORE the
//!   confirmed one;
//! - a backend failure yields outcome "failed" and the cart reverts;
//! - removing the only line lands the cart in the empty state.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

use nb_cart::{BackendError, CommerceBackend};
use nb_daemon::{
    routes,
    state::{self, BusMsg, CartPhase},
};
use nb_storefront_mock::{sample_product, MockShop};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_state() -> (Arc<state::AppState>, Arc<MockShop>) {
    let shop = Arc::new(MockShop::new("EUR"));
    shop.seed_product(sample_product("noabea-body-cream", "var-1", "24.95"));

    let backend: Arc<dyn state::ShopBackend> = shop.clone();
    let initial = shop.fetch_cart().expect("mock cart");
    let st = Arc::new(state::AppState::new(
        backend,
        "noabea-body-cream".to_string(),
        initial,
    ));
    (st, shop)
}

async fn call(
    router: axum::Router,
    req: Request<axum::body::Body>,
) -> (StatusCode, serde_json::Value) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, serde_json::from_slice(&body).expect("invalid JSON"))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn add_line(st: &Arc<state::AppState>, quantity: u32) -> (StatusCode, serde_json::Value) {
    call(
        routes::build_router(Arc::clone(st)),
        post_json(
            "/v1/cart/lines/add",
            serde_json::json!({"merchandise_id": "var-1", "quantity": quantity}),
        ),
    )
    .await
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_line_is_applied_and_controls_enabled() {
    let (st, _shop) = make_state();

    let (status, json) = add_line(&st, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["cart"]["total_quantity"], 2);

    let line = &json["cart"]["lines"][0];
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["optimistic"], false, "confirmed line, flag cleared");

    let controls = &json["controls"][0];
    assert_eq!(controls["increment"], true);
    assert_eq!(controls["decrement"], true);
    assert_eq!(controls["remove"], true);
}

#[tokio::test]
async fn add_unknown_merchandise_is_404() {
    let (st, _shop) = make_state();
    let (status, json) = call(
        routes::build_router(st),
        post_json(
            "/v1/cart/lines/add",
            serde_json::json!({"merchandise_id": "var-404", "quantity": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("var-404"));
}

// ---------------------------------------------------------------------------
// Bus phases
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutation_broadcasts_optimistic_before_confirmed() {
    let (st, _shop) = make_state();
    let mut rx = st.bus.subscribe();

    let (status, _) = add_line(&st, 1).await;
    assert_eq!(status, StatusCode::OK);

    let mut phases = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let BusMsg::Cart { phase, cart } = msg {
            phases.push((phase, cart.total_quantity));
        }
    }
    assert_eq!(
        phases,
        vec![(CartPhase::Optimistic, 1), (CartPhase::Confirmed, 1)],
        "optimistic snapshot must precede the confirmed one"
    );
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn backend_failure_reports_failed_and_reverts() {
    let (st, shop) = make_state();

    // Establish a confirmed line first.
    let (status, _) = add_line(&st, 2).await;
    assert_eq!(status, StatusCode::OK);

    // Next mutation fails at the backend.
    shop.fail_next(BackendError::Unavailable("mock outage".into()));
    let (status, json) = call(
        routes::build_router(Arc::clone(&st)),
        post_json(
            "/v1/cart/lines/update",
            serde_json::json!({"lines": [{"id": "line-1", "quantity": 5}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["outcome"], "failed");
    assert!(json["error"].as_str().unwrap().contains("mock outage"));
    // Rolled back to the confirmed quantity.
    assert_eq!(json["cart"]["lines"][0]["quantity"], 2);
    assert_eq!(json["cart"]["lines"][0]["optimistic"], false);
}

// ---------------------------------------------------------------------------
// Remove to empty
// ---------------------------------------------------------------------------

#[tokio::test]
async fn removing_only_line_empties_cart() {
    let (st, _shop) = make_state();

    let (status, json) = add_line(&st, 1).await;
    assert_eq!(status, StatusCode::OK);
    let line_id = json["cart"]["lines"][0]["id"].as_str().unwrap().to_string();

    let (status, json) = call(
        routes::build_router(Arc::clone(&st)),
        post_json(
            "/v1/cart/lines/remove",
            serde_json::json!({"line_ids": [line_id]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["cart"]["total_quantity"], 0);
    assert!(json["cart"]["lines"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Update quantity round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_quantity_round_trip() {
    let (st, _shop) = make_state();

    let (status, _) = add_line(&st, 2).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = call(
        routes::build_router(Arc::clone(&st)),
        post_json(
            "/v1/cart/lines/update",
            serde_json::json!({"lines": [{"id": "line-1", "quantity": 3}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["cart"]["lines"][0]["quantity"], 3);
    assert_eq!(json["cart"]["cost"]["subtotal"]["amount"], "74.85");
}
