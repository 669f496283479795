//! The seam between the coordinator and the commerce platform.
//!
//! Adapters (live HTTP, deterministic mock) implement [`CommerceBackend`].
//! The trait is synchronous; async service layers bridge with
//! `tokio::task::spawn_blocking`. Payload shapes mirror the platform's
//! mutation inputs: `{merchandise_id, quantity}` for add, `{id, quantity}`
//! for update, bare line ids for remove.

use nb_schemas::{Cart, Product};

use crate::action::MutationRequest;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Add payload entry: `lines: [{merchandiseId, quantity}]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLinePayload {
    pub merchandise_id: String,
    pub quantity: u32,
}

/// Update payload entry: `lines: [{id, quantity}]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLinePayload {
    pub id: String,
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// BackendError
// ---------------------------------------------------------------------------

/// Why a backend mutation did not yield an updated cart.
///
/// Failure is scoped to the mutation that caused it — the coordinator rolls
/// back only the affected pending entry, never the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Transport-level failure (connection, timeout, non-2xx).
    Unavailable(String),
    /// The platform processed the request and refused it.
    Rejected(String),
    /// A named line id does not exist in the backend cart.
    UnknownLine(String),
    /// A named merchandise id does not exist or is not sellable.
    UnknownMerchandise(String),
    /// Neither the requested product nor any fallback product exists.
    /// Terminal for the render that asked.
    NoProducts,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unavailable(msg) => write!(f, "backend unavailable: {msg}"),
            BackendError::Rejected(msg) => write!(f, "backend rejected mutation: {msg}"),
            BackendError::UnknownLine(id) => write!(f, "unknown cart line: {id}"),
            BackendError::UnknownMerchandise(id) => write!(f, "unknown merchandise: {id}"),
            BackendError::NoProducts => write!(f, "no products available"),
        }
    }
}

impl std::error::Error for BackendError {}

// ---------------------------------------------------------------------------
// CommerceBackend
// ---------------------------------------------------------------------------

/// Cart mutation surface of the external commerce platform.
///
/// Every method returns the full authoritative cart after the mutation —
/// the coordinator replaces its confirmed state with it wholesale.
pub trait CommerceBackend: Send + Sync {
    fn lines_add(&self, lines: &[AddLinePayload]) -> Result<Cart, BackendError>;
    fn lines_update(&self, lines: &[UpdateLinePayload]) -> Result<Cart, BackendError>;
    fn lines_remove(&self, line_ids: &[String]) -> Result<Cart, BackendError>;
    /// Fetch the current authoritative cart without mutating it.
    fn fetch_cart(&self) -> Result<Cart, BackendError>;

    /// Dispatch a [`MutationRequest`] to the matching mutation method.
    fn apply(&self, request: &MutationRequest) -> Result<Cart, BackendError> {
        match request {
            MutationRequest::AddLines { lines } => {
                let payload: Vec<AddLinePayload> = lines
                    .iter()
                    .map(|l| AddLinePayload {
                        merchandise_id: l.merchandise.id.clone(),
                        quantity: l.quantity,
                    })
                    .collect();
                self.lines_add(&payload)
            }
            MutationRequest::UpdateLines { lines } => {
                let payload: Vec<UpdateLinePayload> = lines
                    .iter()
                    .map(|l| UpdateLinePayload {
                        id: l.id.clone(),
                        quantity: l.quantity,
                    })
                    .collect();
                self.lines_update(&payload)
            }
            MutationRequest::RemoveLines { line_ids } => self.lines_remove(line_ids),
        }
    }
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Product lookup surface of the platform.
///
/// `Ok(None)` means "no such product" — distinct from a transport failure,
/// because a miss triggers the fallback lookup rather than an error.
pub trait ProductReader: Send + Sync {
    fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, BackendError>;
    /// The shop's most recently updated product, if any.
    fn first_product(&self) -> Result<Option<Product>, BackendError>;
}

/// Both halves of the platform seam in one bound: cart mutations plus
/// product reads. Implemented for free by any type that does both; service
/// layers hold an `Arc<dyn ShopBackend>`.
pub trait ShopBackend: CommerceBackend + ProductReader {}

impl<T: CommerceBackend + ProductReader> ShopBackend for T {}

/// Resolve the product a storefront render is built around.
///
/// Primary lookup by `handle`; on a miss (or a failing primary lookup) fall
/// back to the first available product. If that also yields nothing, the
/// render fails with [`BackendError::NoProducts`].
pub fn resolve_featured_product(
    reader: &dyn ProductReader,
    handle: &str,
) -> Result<Product, BackendError> {
    if let Ok(Some(product)) = reader.product_by_handle(handle) {
        return Ok(product);
    }
    match reader.first_product()? {
        Some(product) => Ok(product),
        None => Err(BackendError::NoProducts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_schemas::Money;

    struct FixedReader {
        by_handle: Option<Product>,
        first: Option<Product>,
    }

    fn product(handle: &str) -> Product {
        Product {
            id: format!("gid://shop/Product/{handle}"),
            title: "NoaBea Body Cream".into(),
            handle: handle.into(),
            vendor: "NoaBea".into(),
            description: String::new(),
            featured_image: None,
            min_price: Money::new("24.95", "EUR"),
            first_variant: None,
            metafields: Vec::new(),
        }
    }

    impl ProductReader for FixedReader {
        fn product_by_handle(&self, _handle: &str) -> Result<Option<Product>, BackendError> {
            Ok(self.by_handle.clone())
        }
        fn first_product(&self) -> Result<Option<Product>, BackendError> {
            Ok(self.first.clone())
        }
    }

    #[test]
    fn primary_hit_wins() {
        let reader = FixedReader {
            by_handle: Some(product("noabea-body-cream")),
            first: Some(product("other-product")),
        };
        let p = resolve_featured_product(&reader, "noabea-body-cream").unwrap();
        assert_eq!(p.handle, "noabea-body-cream");
    }

    #[test]
    fn miss_falls_back_to_first_product() {
        let reader = FixedReader {
            by_handle: None,
            first: Some(product("other-product")),
        };
        let p = resolve_featured_product(&reader, "noabea-body-cream").unwrap();
        assert_eq!(p.handle, "other-product");
    }

    #[test]
    fn empty_shop_is_terminal() {
        let reader = FixedReader {
            by_handle: None,
            first: None,
        };
        assert_eq!(
            resolve_featured_product(&reader, "noabea-body-cream").unwrap_err(),
            BackendError::NoProducts
        );
    }

    #[test]
    fn failing_primary_lookup_still_falls_back() {
        struct PrimaryFails;
        impl ProductReader for PrimaryFails {
            fn product_by_handle(&self, h: &str) -> Result<Option<Product>, BackendError> {
                Err(BackendError::Unavailable(format!("lookup {h} failed")))
            }
            fn first_product(&self) -> Result<Option<Product>, BackendError> {
                Ok(Some(product("other-product")))
            }
        }
        let p = resolve_featured_product(&PrimaryFails, "noabea-body-cream").unwrap();
        assert_eq!(p.handle, "other-product");
    }
}
