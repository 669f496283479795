//! Wire shapes of Storefront API responses, and their conversion into the
//! workspace data model.
//!
//! The platform serializes in camelCase; everything here is deserialized
//! with `rename_all` and immediately converted, so nothing outside this
//! module sees a wire type. `metafields(identifiers:)` returns `null` for
//! identifiers the shop has not populated — hence `Vec<Option<_>>`.

use serde::Deserialize;
use serde_json::Value;

use nb_schemas::{
    Cart, CartCost, CartLine, Image, Merchandise, Metafield, Money, Product, SelectedOption,
};

use crate::StorefrontError;

// ---------------------------------------------------------------------------
// Shared leaf shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoneyWire {
    pub amount: String,
    pub currency_code: String,
}

impl From<MoneyWire> for Money {
    fn from(w: MoneyWire) -> Self {
        Money::new(w.amount, w.currency_code)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageWire {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<ImageWire> for Image {
    fn from(w: ImageWire) -> Self {
        Image {
            url: w.url,
            alt_text: w.alt_text,
            width: w.width,
            height: w.height,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectedOptionWire {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRefWire {
    pub title: String,
    pub handle: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantWire {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: MoneyWire,
    pub image: Option<ImageWire>,
    pub selected_options: Vec<SelectedOptionWire>,
    pub product: ProductRefWire,
}

impl From<VariantWire> for Merchandise {
    fn from(w: VariantWire) -> Self {
        Merchandise {
            id: w.id,
            product_title: w.product.title,
            product_handle: w.product.handle,
            title: w.title,
            selected_options: w
                .selected_options
                .into_iter()
                .map(|o| SelectedOption {
                    name: o.name,
                    value: o.value,
                })
                .collect(),
            image: w.image.map(Image::from),
            available_for_sale: w.available_for_sale,
            price: w.price.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Nodes<T> {
    pub nodes: Vec<T>,
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceRangeWire {
    pub min_variant_price: MoneyWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetafieldWire {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductWire {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub vendor: String,
    #[serde(default)]
    pub description: String,
    pub featured_image: Option<ImageWire>,
    pub price_range: PriceRangeWire,
    pub variants: Nodes<VariantWire>,
    /// Null entries are unpopulated identifiers.
    #[serde(default)]
    pub metafields: Vec<Option<MetafieldWire>>,
}

impl From<ProductWire> for Product {
    fn from(w: ProductWire) -> Self {
        Product {
            id: w.id,
            title: w.title,
            handle: w.handle,
            vendor: w.vendor,
            description: w.description,
            featured_image: w.featured_image.map(Image::from),
            min_price: w.price_range.min_variant_price.into(),
            first_variant: w.variants.nodes.into_iter().next().map(Merchandise::from),
            metafields: w
                .metafields
                .into_iter()
                .flatten()
                .map(|m| Metafield {
                    namespace: m.namespace,
                    key: m.key,
                    value: m.value,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LineCostWire {
    pub total_amount: MoneyWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineWire {
    pub id: String,
    pub quantity: u32,
    pub cost: LineCostWire,
    pub merchandise: VariantWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartCostWire {
    pub subtotal_amount: MoneyWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartWire {
    pub id: String,
    pub checkout_url: Option<String>,
    pub total_quantity: u32,
    pub cost: CartCostWire,
    pub lines: Nodes<LineWire>,
}

impl From<CartWire> for Cart {
    fn from(w: CartWire) -> Self {
        Cart {
            id: w.id,
            lines: w
                .lines
                .nodes
                .into_iter()
                .map(|l| CartLine {
                    id: l.id,
                    merchandise: l.merchandise.into(),
                    quantity: l.quantity,
                    cost: l.cost.total_amount.into(),
                    optimistic: false,
                })
                .collect(),
            total_quantity: w.total_quantity,
            cost: CartCost {
                subtotal: w.cost.subtotal_amount.into(),
            },
            checkout_url: w.checkout_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Decode helpers
// ---------------------------------------------------------------------------

/// Only the message is consumed; the platform's `field` path is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct UserErrorWire {
    pub message: String,
}

/// Decode `data.product` (or one element of `data.products.nodes`).
/// A JSON `null` means "no such product".
pub(crate) fn decode_product(value: &Value) -> Result<Option<Product>, StorefrontError> {
    if value.is_null() {
        return Ok(None);
    }
    let wire: ProductWire = serde_json::from_value(value.clone())
        .map_err(|e| StorefrontError::Decode(format!("product: {e}")))?;
    Ok(Some(wire.into()))
}

/// Decode a cart object.
pub(crate) fn decode_cart(value: &Value) -> Result<Cart, StorefrontError> {
    let wire: CartWire = serde_json::from_value(value.clone())
        .map_err(|e| StorefrontError::Decode(format!("cart: {e}")))?;
    Ok(wire.into())
}

/// Decode the payload of a cart mutation (`data.<field>`): surfaces
/// `userErrors` and returns the embedded cart.
pub(crate) fn decode_mutation_cart(data: &Value, field: &str) -> Result<Cart, StorefrontError> {
    let payload = data
        .get(field)
        .ok_or_else(|| StorefrontError::Decode(format!("missing mutation field {field}")))?;

    let user_errors: Vec<UserErrorWire> = match payload.get("userErrors") {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map_err(|e| StorefrontError::Decode(format!("userErrors: {e}")))?,
        _ => Vec::new(),
    };
    if !user_errors.is_empty() {
        return Err(StorefrontError::UserErrors(
            user_errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    let cart = payload
        .get("cart")
        .filter(|v| !v.is_null())
        .ok_or_else(|| StorefrontError::Decode(format!("{field} returned no cart")))?;
    decode_cart(cart)
}

// ---------------------------------------------------------------------------
// Unit tests — fixture decoding
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variant_json() -> Value {
        json!({
            "id": "gid://shop/ProductVariant/1",
            "title": "50ml",
            "availableForSale": true,
            "price": {"amount": "24.95", "currencyCode": "EUR"},
            "image": {"url": "https://cdn.example/jar.jpg", "altText": "Jar", "width": 1080, "height": 1080},
            "selectedOptions": [{"name": "Size", "value": "50ml"}],
            "product": {"title": "NoaBea Body Cream", "handle": "noabea-body-cream"}
        })
    }

    #[test]
    fn decodes_full_product() {
        let value = json!({
            "id": "gid://shop/Product/1",
            "title": "NoaBea Body Cream",
            "handle": "noabea-body-cream",
            "vendor": "NoaBea",
            "description": "Botanical body cream.",
            "featuredImage": {"url": "https://cdn.example/jar.jpg", "altText": null, "width": 1080, "height": 1080},
            "priceRange": {"minVariantPrice": {"amount": "24.95", "currencyCode": "EUR"}},
            "variants": {"nodes": [variant_json()]},
            "metafields": [
                {"namespace": "custom", "key": "size", "value": "50ml"},
                null,
                {"namespace": "custom", "key": "scent", "value": "lavender & chamomile"}
            ]
        });

        let product = decode_product(&value).unwrap().unwrap();
        assert_eq!(product.handle, "noabea-body-cream");
        assert_eq!(product.min_price, Money::new("24.95", "EUR"));
        let variant = product.first_variant.unwrap();
        assert_eq!(variant.id, "gid://shop/ProductVariant/1");
        assert_eq!(variant.product_handle, "noabea-body-cream");
        assert_eq!(variant.selected_options.len(), 1);
        // Null metafields are dropped, populated ones kept.
        assert_eq!(product.metafields.len(), 2);
        assert_eq!(product.metafields[1].key, "scent");
    }

    #[test]
    fn null_product_is_none() {
        assert_eq!(decode_product(&Value::Null).unwrap(), None);
    }

    #[test]
    fn decodes_cart_with_lines() {
        let value = json!({
            "id": "gid://shop/Cart/abc",
            "checkoutUrl": "https://shop.example/checkout/abc",
            "totalQuantity": 2,
            "cost": {"subtotalAmount": {"amount": "49.9", "currencyCode": "EUR"}},
            "lines": {"nodes": [{
                "id": "gid://shop/CartLine/1",
                "quantity": 2,
                "cost": {"totalAmount": {"amount": "49.9", "currencyCode": "EUR"}},
                "merchandise": variant_json()
            }]}
        });

        let cart = decode_cart(&value).unwrap();
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.lines.len(), 1);
        assert!(!cart.lines[0].optimistic, "wire lines are confirmed state");
        assert_eq!(cart.lines[0].cost, Money::new("49.9", "EUR"));
        assert_eq!(cart.checkout_url.as_deref(), Some("https://shop.example/checkout/abc"));
    }

    #[test]
    fn mutation_user_errors_surface() {
        let data = json!({
            "cartLinesUpdate": {
                "cart": null,
                "userErrors": [{"field": ["lines"], "message": "Merchandise is sold out"}]
            }
        });
        let err = decode_mutation_cart(&data, "cartLinesUpdate").unwrap_err();
        match err {
            StorefrontError::UserErrors(msgs) => {
                assert_eq!(msgs, vec!["Merchandise is sold out".to_string()]);
            }
            other => panic!("expected UserErrors, got {other:?}"),
        }
    }

    #[test]
    fn mutation_without_cart_is_a_decode_error() {
        let data = json!({"cartLinesAdd": {"cart": null, "userErrors": []}});
        let err = decode_mutation_cart(&data, "cartLinesAdd").unwrap_err();
        assert!(matches!(err, StorefrontError::Decode(_)));
    }
}
