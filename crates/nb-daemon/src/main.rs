//! nb-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, builds the backend
//! and shared state, wires middleware, and starts the HTTP server. All route
//! handlers live in `routes.rs`; all shared state types live in `state.rs`.
//!
//! Backend selection: `NB_BACKEND=mock` runs against the in-memory shop (no
//! token, no network); anything else builds the live Storefront client from
//! the layered config named by `NB_CONFIG_PATHS`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use nb_cart::CommerceBackend;
use nb_config::StorefrontSettings;
use nb_daemon::{routes, state};
use nb_schemas::Cart;
use nb_storefront::StorefrontClient;
use nb_storefront_mock::{sample_product, MockShop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let (backend, featured_handle, bind_override): (Arc<dyn state::ShopBackend>, String, Option<String>) =
        if std::env::var("NB_BACKEND").as_deref() == Ok("mock") {
            let shop = MockShop::new("EUR");
            shop.seed_product(sample_product(
                "noabea-body-cream",
                "gid://mock/ProductVariant/1",
                "24.95",
            ));
            info!("running against the in-memory mock shop");
            (Arc::new(shop), "noabea-body-cream".to_string(), None)
        } else {
            let settings = load_settings()?;
            let client = StorefrontClient::from_settings(&settings)
                .context("building storefront client")?;
            (
                Arc::new(client),
                settings.featured_handle,
                settings.bind_addr,
            )
        };

    // Prime the confirmed cart from the backend; an unreachable backend is
    // not fatal at boot — the first mutation will surface it.
    let initial_cart = {
        let backend = Arc::clone(&backend);
        tokio::task::spawn_blocking(move || backend.fetch_cart())
            .await
            .context("initial cart task")?
            .unwrap_or_else(|err| {
                warn!(%err, "could not fetch initial cart; starting empty");
                Cart::empty("local", "EUR")
            })
    };

    let shared = Arc::new(state::AppState::new(backend, featured_handle, initial_cart));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env()
        .or_else(|| bind_override.and_then(|s| s.parse().ok()))
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)));
    info!("nb-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// Load layered YAML config from `NB_CONFIG_PATHS` (comma-separated, merge
/// order) and extract the storefront settings.
fn load_settings() -> anyhow::Result<StorefrontSettings> {
    let paths_var =
        std::env::var("NB_CONFIG_PATHS").unwrap_or_else(|_| "config/base.yaml".to_string());
    let paths: Vec<&str> = paths_var.split(',').map(str::trim).collect();
    let loaded = nb_config::load_layered_yaml(&paths).context("loading layered config")?;
    info!(config_hash = %loaded.config_hash, "config loaded");
    StorefrontSettings::from_config(&loaded.config_json)
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("NB_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
