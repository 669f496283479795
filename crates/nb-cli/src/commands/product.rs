use anyhow::{Context, Result};

use nb_cart::{resolve_featured_product, ProductReader};

use super::backend_from_env;

/// Resolve a product (with first-product fallback) and print it as JSON.
pub fn run(handle: Option<String>) -> Result<()> {
    let (backend, featured_handle) = backend_from_env()?;
    let handle = handle.unwrap_or(featured_handle);

    let reader: &dyn ProductReader = backend.as_ref();
    let product = resolve_featured_product(reader, &handle)
        .with_context(|| format!("resolving product {handle}"))?;

    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}
