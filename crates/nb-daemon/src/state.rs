//! Shared runtime state for nb-daemon.
//!
//! All types here are `Clone`-able (via `Arc` or copy). Handlers receive
//! `State<Arc<AppState>>` from Axum; this module owns nothing async itself.
//! The coordinator behind `session` is the ONLY writer of cart state — it is
//! created once at startup and reached exclusively through these fields.

use std::sync::Arc;
use std::time::Duration;

use nb_cart::CartCoordinator;
use nb_schemas::Cart;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

pub use nb_cart::ShopBackend;

// ---------------------------------------------------------------------------
// BusMsg — SSE event bus payload
// ---------------------------------------------------------------------------

/// Which stage of a mutation a broadcast cart snapshot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartPhase {
    /// Projected immediately after submit, before the backend answered.
    Optimistic,
    /// Projected after a completion reconciled the backend outcome.
    Confirmed,
}

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    Cart { phase: CartPhase, cart: Cart },
    LogLine { level: String, msg: String },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// The cart mutation coordinator — single writer of cart state.
    pub session: Arc<RwLock<CartCoordinator>>,
    /// Commerce backend this daemon fronts.
    pub backend: Arc<dyn ShopBackend>,
    /// Handle of the product the storefront is built around.
    pub featured_handle: String,
}

impl AppState {
    pub fn new(backend: Arc<dyn ShopBackend>, featured_handle: String, initial_cart: Cart) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);
        Self {
            bus,
            build: BuildInfo {
                service: "nb-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            session: Arc::new(RwLock::new(CartCoordinator::new(initial_cart))),
            backend,
            featured_handle,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
