//! Request and response types for all nb-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded by
//! Axum and decoded by tests. No business logic lives here.

use nb_cart::{LineControls, LineUpdateInput};
use nb_schemas::{Cart, Product};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body for any non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// /v1/product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ProductQuery {
    /// Defaults to the configured featured handle.
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

// ---------------------------------------------------------------------------
// /v1/cart
// ---------------------------------------------------------------------------

/// Per-line control state, precomputed so the rendering layer never
/// re-derives policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineControlState {
    pub line_id: String,
    pub increment: bool,
    pub decrement: bool,
    pub remove: bool,
}

impl LineControlState {
    pub fn new(line_id: &str, controls: LineControls) -> Self {
        Self {
            line_id: line_id.to_string(),
            increment: controls.increment,
            decrement: controls.decrement,
            remove: controls.remove,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart: Cart,
    pub controls: Vec<LineControlState>,
}

// ---------------------------------------------------------------------------
// /v1/cart/lines/*
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLinesRequest {
    pub merchandise_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLinesRequest {
    pub lines: Vec<LineUpdateInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveLinesRequest {
    pub line_ids: Vec<String>,
}

/// Outcome of a mutation round-trip.
///
/// `outcome` is `"applied"`, `"superseded"`, or `"failed"`; `cart` is the
/// displayed (projected) cart after reconciliation either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cart: Cart,
    pub controls: Vec<LineControlState>,
}
