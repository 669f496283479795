//! Command implementations and shared backend wiring.

use std::sync::Arc;

use anyhow::{Context, Result};

use nb_cart::ShopBackend;
use nb_config::StorefrontSettings;
use nb_storefront::StorefrontClient;
use nb_storefront_mock::{sample_product, MockShop};

pub mod cart;
pub mod product;

/// Build the backend the way the daemon does: `NB_BACKEND=mock` for the
/// in-memory shop, otherwise the live client from layered config.
pub fn backend_from_env() -> Result<(Arc<dyn ShopBackend>, String)> {
    if std::env::var("NB_BACKEND").as_deref() == Ok("mock") {
        let shop = MockShop::new("EUR");
        shop.seed_product(sample_product(
            "noabea-body-cream",
            "gid://mock/ProductVariant/1",
            "24.95",
        ));
        return Ok((Arc::new(shop), "noabea-body-cream".to_string()));
    }

    let paths_var =
        std::env::var("NB_CONFIG_PATHS").unwrap_or_else(|_| "config/base.yaml".to_string());
    let paths: Vec<&str> = paths_var.split(',').map(str::trim).collect();
    let loaded = nb_config::load_layered_yaml(&paths).context("loading layered config")?;
    tracing::info!(config_hash = %loaded.config_hash, "config loaded");
    let settings = StorefrontSettings::from_config(&loaded.config_json)?;
    let client =
        StorefrontClient::from_settings(&settings).context("building storefront client")?;
    Ok((Arc::new(client), settings.featured_handle))
}
