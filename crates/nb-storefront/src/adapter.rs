//! `ProductReader` and `CommerceBackend` implementations for the live client.

use serde_json::json;

use nb_cart::{AddLinePayload, BackendError, CommerceBackend, ProductReader, UpdateLinePayload};
use nb_schemas::{Cart, Product};

use crate::queries;
use crate::wire::{decode_mutation_cart, decode_product};
use crate::{StorefrontClient, StorefrontError};

impl StorefrontClient {
    /// The platform cart id this client mutates, creating the cart on first
    /// use.
    fn ensure_cart(&self) -> Result<String, StorefrontError> {
        if let Some(id) = self.cart_id() {
            return Ok(id);
        }
        let data = self.execute(&queries::cart_create_mutation(), json!({}))?;
        let cart = decode_mutation_cart(&data, "cartCreate")?;
        self.set_cart_id(cart.id.clone());
        Ok(cart.id)
    }
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

impl ProductReader for StorefrontClient {
    fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, BackendError> {
        let data = self
            .execute(&queries::product_by_handle_query(), json!({"handle": handle}))
            .map_err(BackendError::from)?;
        let product = data
            .get("product")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        decode_product(&product).map_err(BackendError::from)
    }

    fn first_product(&self) -> Result<Option<Product>, BackendError> {
        let data = self
            .execute(&queries::first_product_query(), json!({}))
            .map_err(BackendError::from)?;
        let first = data
            .pointer("/products/nodes/0")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        decode_product(&first).map_err(BackendError::from)
    }
}

// ---------------------------------------------------------------------------
// Mutation side
// ---------------------------------------------------------------------------

impl CommerceBackend for StorefrontClient {
    fn lines_add(&self, lines: &[AddLinePayload]) -> Result<Cart, BackendError> {
        let cart_id = self.ensure_cart().map_err(BackendError::from)?;
        let lines_json: Vec<_> = lines
            .iter()
            .map(|l| json!({"merchandiseId": l.merchandise_id, "quantity": l.quantity}))
            .collect();
        let data = self
            .execute(
                &queries::cart_lines_add_mutation(),
                json!({"cartId": cart_id, "lines": lines_json}),
            )
            .map_err(BackendError::from)?;
        decode_mutation_cart(&data, "cartLinesAdd").map_err(BackendError::from)
    }

    fn lines_update(&self, lines: &[UpdateLinePayload]) -> Result<Cart, BackendError> {
        let cart_id = self.ensure_cart().map_err(BackendError::from)?;
        let lines_json: Vec<_> = lines
            .iter()
            .map(|l| json!({"id": l.id, "quantity": l.quantity}))
            .collect();
        let data = self
            .execute(
                &queries::cart_lines_update_mutation(),
                json!({"cartId": cart_id, "lines": lines_json}),
            )
            .map_err(BackendError::from)?;
        decode_mutation_cart(&data, "cartLinesUpdate").map_err(BackendError::from)
    }

    fn lines_remove(&self, line_ids: &[String]) -> Result<Cart, BackendError> {
        let cart_id = self.ensure_cart().map_err(BackendError::from)?;
        let data = self
            .execute(
                &queries::cart_lines_remove_mutation(),
                json!({"cartId": cart_id, "lineIds": line_ids}),
            )
            .map_err(BackendError::from)?;
        decode_mutation_cart(&data, "cartLinesRemove").map_err(BackendError::from)
    }

    fn fetch_cart(&self) -> Result<Cart, BackendError> {
        let cart_id = self.ensure_cart().map_err(BackendError::from)?;
        let data = self
            .execute(&queries::cart_query(), json!({"cartId": cart_id}))
            .map_err(BackendError::from)?;
        let cart = data
            .get("cart")
            .filter(|v| !v.is_null())
            .ok_or_else(|| BackendError::Unavailable("cart no longer exists".into()))?;
        crate::wire::decode_cart(cart).map_err(BackendError::from)
    }
}
