//! Axum router and all HTTP handlers for nb-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.
//!
//! Mutation handlers follow one shape: submit to the coordinator (the
//! optimistic snapshot goes out on the SSE bus immediately), run the blocking
//! backend call off the async runtime, then reconcile with `complete`. A
//! superseded outcome is a normal 200 — the response cart simply reflects the
//! newer in-flight mutation.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;

use nb_cart::{
    resolve_featured_product, AddLineInput, BackendError, CommerceBackend, Completion,
    LineControls, MutationRequest, ProductReader,
};
use nb_schemas::{Cart, Merchandise};

use crate::api_types::{
    AddLinesRequest, CartResponse, ErrorResponse, HealthResponse, LineControlState,
    MutationResponse, ProductQuery, ProductResponse, RemoveLinesRequest, UpdateLinesRequest,
};
use crate::state::{AppState, BusMsg, CartPhase};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/product", get(product))
        .route("/v1/cart", get(cart))
        .route("/v1/cart/lines/add", post(cart_lines_add))
        .route("/v1/cart/lines/update", post(cart_lines_update))
        .route("/v1/cart/lines/remove", post(cart_lines_remove))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/product
// ---------------------------------------------------------------------------

/// Resolve the product a render is built around. Missing handles fall back
/// to the first available product; an empty shop is a 404.
pub(crate) async fn product(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ProductQuery>,
) -> Response {
    let handle = q.handle.unwrap_or_else(|| st.featured_handle.clone());
    let backend = Arc::clone(&st.backend);

    let resolved = tokio::task::spawn_blocking(move || {
        let reader: &dyn ProductReader = backend.as_ref();
        resolve_featured_product(reader, &handle)
    })
    .await
    .unwrap_or_else(|e| Err(BackendError::Unavailable(format!("backend task: {e}"))));

    match resolved {
        Ok(product) => (StatusCode::OK, Json(ProductResponse { product })).into_response(),
        Err(BackendError::NoProducts) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no products found".to_string(),
            }),
        )
            .into_response(),
        Err(other) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: other.to_string(),
            }),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/cart
// ---------------------------------------------------------------------------

pub(crate) async fn cart(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let displayed = st.session.read().await.displayed();
    (StatusCode::OK, Json(cart_response(displayed)))
}

fn line_controls(cart: &Cart) -> Vec<LineControlState> {
    cart.lines
        .iter()
        .map(|l| LineControlState::new(&l.id, LineControls::for_line(l)))
        .collect()
}

fn cart_response(cart: Cart) -> CartResponse {
    CartResponse {
        controls: line_controls(&cart),
        cart,
    }
}

// ---------------------------------------------------------------------------
// POST /v1/cart/lines/add
// ---------------------------------------------------------------------------

pub(crate) async fn cart_lines_add(
    State(st): State<Arc<AppState>>,
    Json(req): Json<AddLinesRequest>,
) -> Response {
    let Some(merchandise) = find_merchandise(&st, &req.merchandise_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown merchandise: {}", req.merchandise_id),
            }),
        )
            .into_response();
    };

    let request = MutationRequest::AddLines {
        lines: vec![AddLineInput {
            merchandise,
            quantity: req.quantity.max(1),
        }],
    };
    run_mutation(&st, request).await
}

/// Locate the merchandise behind an add request: a variant already in the
/// cart, or the featured product's variant.
async fn find_merchandise(st: &Arc<AppState>, merchandise_id: &str) -> Option<Merchandise> {
    {
        let session = st.session.read().await;
        if let Some(line) = session.displayed().line_for_merchandise(merchandise_id) {
            return Some(line.merchandise.clone());
        }
    }

    let backend = Arc::clone(&st.backend);
    let handle = st.featured_handle.clone();
    let resolved = tokio::task::spawn_blocking(move || {
        let reader: &dyn ProductReader = backend.as_ref();
        resolve_featured_product(reader, &handle)
    })
    .await
    .ok()?
    .ok()?;

    resolved
        .first_variant
        .filter(|v| v.id == merchandise_id)
}

// ---------------------------------------------------------------------------
// POST /v1/cart/lines/update
// ---------------------------------------------------------------------------

pub(crate) async fn cart_lines_update(
    State(st): State<Arc<AppState>>,
    Json(req): Json<UpdateLinesRequest>,
) -> Response {
    run_mutation(&st, MutationRequest::UpdateLines { lines: req.lines }).await
}

// ---------------------------------------------------------------------------
// POST /v1/cart/lines/remove
// ---------------------------------------------------------------------------

pub(crate) async fn cart_lines_remove(
    State(st): State<Arc<AppState>>,
    Json(req): Json<RemoveLinesRequest>,
) -> Response {
    run_mutation(
        &st,
        MutationRequest::RemoveLines {
            line_ids: req.line_ids,
        },
    )
    .await
}

// ---------------------------------------------------------------------------
// Mutation round-trip
// ---------------------------------------------------------------------------

async fn run_mutation(st: &Arc<AppState>, request: MutationRequest) -> Response {
    let correlation = Uuid::new_v4();

    let ticket = st.session.write().await.submit(request.clone());
    info!(%correlation, key = %ticket.key, seq = ticket.seq, "cart mutation submitted");

    // Optimistic snapshot goes out before the backend is consulted.
    let optimistic = st.session.read().await.displayed();
    let _ = st.bus.send(BusMsg::Cart {
        phase: CartPhase::Optimistic,
        cart: optimistic,
    });

    let backend = Arc::clone(&st.backend);
    let backend_request = request.clone();
    let outcome = tokio::task::spawn_blocking(move || backend.apply(&backend_request))
        .await
        .unwrap_or_else(|e| Err(BackendError::Unavailable(format!("backend task: {e}"))));

    let completion = st.session.write().await.complete(&ticket, outcome);
    let displayed = st.session.read().await.displayed();
    let _ = st.bus.send(BusMsg::Cart {
        phase: CartPhase::Confirmed,
        cart: displayed.clone(),
    });

    match completion {
        Completion::Applied => {
            info!(%correlation, key = %ticket.key, "cart mutation applied");
            mutation_response(StatusCode::OK, "applied", None, displayed)
        }
        Completion::Superseded => {
            info!(%correlation, key = %ticket.key, "cart mutation superseded");
            mutation_response(StatusCode::OK, "superseded", None, displayed)
        }
        Completion::Failed(err) => {
            warn!(%correlation, key = %ticket.key, error = %err, "cart mutation failed");
            let status = match err {
                BackendError::Unavailable(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            mutation_response(status, "failed", Some(err.to_string()), displayed)
        }
    }
}

fn mutation_response(
    status: StatusCode,
    outcome: &str,
    error: Option<String>,
    cart: Cart,
) -> Response {
    (
        status,
        Json(MutationResponse {
            outcome: outcome.to_string(),
            error,
            controls: line_controls(&cart),
            cart,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::Cart { .. } => "cart",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
