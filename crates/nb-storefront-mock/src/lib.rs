//! Deterministic in-memory shop backend.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - Line ids come from a per-shop counter: `line-1`, `line-2`, …
//! - Adding a variant already in the cart merges quantities into the
//!   existing line instead of creating a second one.
//! - Updating a line to quantity 0 removes it; removing an unknown line id
//!   is a no-op (the platform treats it the same way).
//! - Totals are recomputed on every mutation.
//! - No randomness. No timestamps. Identical operation sequences produce
//!   identical carts, ids included.
//!
//! `fail_next` arms a one-shot failure so scenario tests can drive the
//! rollback path without a real network.

use std::sync::Mutex;

use nb_cart::{AddLinePayload, BackendError, CommerceBackend, ProductReader, UpdateLinePayload};
use nb_schemas::{Amount, Cart, CartLine, Merchandise, Money, Product};

// ---------------------------------------------------------------------------
// MockShop
// ---------------------------------------------------------------------------

/// In-memory commerce backend for tests and offline development.
///
/// Interior-mutable behind a `Mutex` so it can be shared as
/// `Arc<dyn CommerceBackend>` exactly like the live adapter.
pub struct MockShop {
    inner: Mutex<Inner>,
}

struct Inner {
    products: Vec<Product>,
    cart: Cart,
    next_line: u64,
    fail_next: Option<BackendError>,
}

impl MockShop {
    /// An empty shop with an empty cart in the given currency.
    pub fn new(currency_code: &str) -> Self {
        Self {
            inner: Mutex::new(Inner {
                products: Vec::new(),
                cart: Cart::empty("mock-cart-1", currency_code),
                next_line: 0,
                fail_next: None,
            }),
        }
    }

    /// Seed a product for the read side. Seeding order is lookup order.
    pub fn seed_product(&self, product: Product) {
        self.inner.lock().unwrap().products.push(product);
    }

    /// Arm a one-shot failure: the NEXT mutation returns `err` instead of
    /// touching the cart.
    pub fn fail_next(&self, err: BackendError) {
        self.inner.lock().unwrap().fail_next = Some(err);
    }
}

impl ProductReader for MockShop {
    fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, BackendError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.handle == handle)
            .cloned())
    }

    /// Fallback lookup: the first seeded product, if any.
    fn first_product(&self) -> Result<Option<Product>, BackendError> {
        Ok(self.inner.lock().unwrap().products.first().cloned())
    }
}

impl Inner {
    fn take_failure(&mut self) -> Option<BackendError> {
        self.fail_next.take()
    }

    fn merchandise_for(&self, merchandise_id: &str) -> Option<Merchandise> {
        self.products
            .iter()
            .filter_map(|p| p.first_variant.as_ref())
            .find(|v| v.id == merchandise_id)
            .cloned()
    }

    fn recompute_totals(&mut self) {
        self.cart.total_quantity = self.cart.lines.iter().map(|l| l.quantity).sum();
        let currency = self.cart.cost.subtotal.currency_code.clone();
        let mut subtotal = Amount::ZERO;
        for line in &self.cart.lines {
            if let Ok(a) = line.cost.to_amount() {
                subtotal = subtotal.saturating_add(a);
            }
        }
        self.cart.cost.subtotal = Money::from_amount(subtotal, currency);
        self.cart.checkout_url = if self.cart.lines.is_empty() {
            None
        } else {
            Some(format!("https://mock.shop/checkout/{}", self.cart.id))
        };
    }

    fn line_cost(merchandise: &Merchandise, quantity: u32) -> Money {
        match merchandise
            .price
            .to_amount()
            .ok()
            .and_then(|unit| unit.checked_mul_qty(quantity))
        {
            Some(total) => Money::from_amount(total, &merchandise.price.currency_code),
            None => merchandise.price.clone(),
        }
    }
}

impl CommerceBackend for MockShop {
    fn lines_add(&self, lines: &[AddLinePayload]) -> Result<Cart, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }

        for add in lines {
            let merchandise = inner
                .merchandise_for(&add.merchandise_id)
                .ok_or_else(|| BackendError::UnknownMerchandise(add.merchandise_id.clone()))?;

            if let Some(line) = inner
                .cart
                .lines
                .iter_mut()
                .find(|l| l.merchandise.id == add.merchandise_id)
            {
                line.quantity += add.quantity;
                line.cost = Inner::line_cost(&line.merchandise, line.quantity);
                continue;
            }

            inner.next_line += 1;
            let id = format!("line-{}", inner.next_line);
            let quantity = add.quantity.max(1);
            inner.cart.lines.push(CartLine {
                id,
                cost: Inner::line_cost(&merchandise, quantity),
                merchandise,
                quantity,
                optimistic: false,
            });
        }

        inner.recompute_totals();
        Ok(inner.cart.clone())
    }

    fn lines_update(&self, lines: &[UpdateLinePayload]) -> Result<Cart, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }

        for update in lines {
            let exists = inner.cart.lines.iter().any(|l| l.id == update.id);
            if !exists {
                return Err(BackendError::UnknownLine(update.id.clone()));
            }
            if update.quantity == 0 {
                inner.cart.lines.retain(|l| l.id != update.id);
                continue;
            }
            if let Some(line) = inner.cart.lines.iter_mut().find(|l| l.id == update.id) {
                line.quantity = update.quantity;
                line.cost = Inner::line_cost(&line.merchandise, update.quantity);
            }
        }

        inner.recompute_totals();
        Ok(inner.cart.clone())
    }

    fn lines_remove(&self, line_ids: &[String]) -> Result<Cart, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.take_failure() {
            return Err(err);
        }

        inner.cart.lines.retain(|l| !line_ids.contains(&l.id));
        inner.recompute_totals();
        Ok(inner.cart.clone())
    }

    fn fetch_cart(&self) -> Result<Cart, BackendError> {
        Ok(self.inner.lock().unwrap().cart.clone())
    }
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// A ready-made single-variant product for tests.
pub fn sample_product(handle: &str, variant_id: &str, price: &str) -> Product {
    let variant = Merchandise {
        id: variant_id.into(),
        product_title: "NoaBea Body Cream".into(),
        product_handle: handle.into(),
        title: "50ml".into(),
        selected_options: vec![nb_schemas::SelectedOption {
            name: "Size".into(),
            value: "50ml".into(),
        }],
        image: None,
        available_for_sale: true,
        price: Money::new(price, "EUR"),
    };
    Product {
        id: format!("gid://mock/Product/{handle}"),
        title: "NoaBea Body Cream".into(),
        handle: handle.into(),
        vendor: "NoaBea".into(),
        description: "Botanical body cream.".into(),
        featured_image: None,
        min_price: Money::new(price, "EUR"),
        first_variant: Some(variant),
        metafields: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
