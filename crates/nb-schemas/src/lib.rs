//! Shared data model for the NoaBea storefront workspace.
//!
//! These are the types every other crate speaks: the cart and its lines as
//! the front end projects them, the product/variant shapes the read side
//! resolves, and the [`Money`]/[`Amount`] pair used for totals. The external
//! commerce platform owns the authoritative versions of all of this; the
//! structs here are our projection of its responses, not its schema.

use serde::{Deserialize, Serialize};

pub mod money;

pub use money::{Amount, AmountParseError, MICROS_PER_UNIT};

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A monetary value as the platform serializes it: decimal string + currency.
///
/// Arithmetic never happens on this form; convert through [`Money::amount`]
/// to an [`Amount`] first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal string, e.g. `"24.95"`.
    pub amount: String,
    /// ISO currency code, e.g. `"EUR"`.
    pub currency_code: String,
}

impl Money {
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// Zero in the given currency.
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new("0.0", currency_code)
    }

    /// Parse the decimal string into a fixed-point [`Amount`].
    pub fn to_amount(&self) -> Result<Amount, AmountParseError> {
        Amount::parse(&self.amount)
    }

    /// Build from a fixed-point [`Amount`] in the given currency.
    pub fn from_amount(amount: Amount, currency_code: impl Into<String>) -> Self {
        Self::new(amount.to_string(), currency_code)
    }
}

// ---------------------------------------------------------------------------
// Product side
// ---------------------------------------------------------------------------

/// One selected option on a variant, e.g. `Size: 50ml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A purchasable variant: the `merchandise` behind a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchandise {
    /// Platform variant id.
    pub id: String,
    pub product_title: String,
    pub product_handle: String,
    /// Variant title (often the option combination, e.g. `"50ml"`).
    pub title: String,
    pub selected_options: Vec<SelectedOption>,
    pub image: Option<Image>,
    pub available_for_sale: bool,
    /// Per-unit price.
    pub price: Money,
}

/// Descriptive metafield attached to a product (size, texture, scent, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

/// A product as the read side resolves it for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub vendor: String,
    pub description: String,
    pub featured_image: Option<Image>,
    /// Minimum variant price of the product.
    pub min_price: Money,
    /// First (usually only) variant, used for add-to-cart.
    pub first_variant: Option<Merchandise>,
    pub metafields: Vec<Metafield>,
}

// ---------------------------------------------------------------------------
// Cart side
// ---------------------------------------------------------------------------

/// One merchandise entry (with quantity) inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line id, unique within the cart. Backend-assigned once confirmed;
    /// derived from the merchandise id while the line is optimistic.
    pub id: String,
    pub merchandise: Merchandise,
    /// Always ≥ 1; a line at quantity 0 is removed instead.
    pub quantity: u32,
    /// Line total (unit price × quantity).
    pub cost: Money,
    /// True while this line reflects a mutation the backend has not yet
    /// confirmed. Quantity controls are disabled while set.
    #[serde(default)]
    pub optimistic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    pub subtotal: Money,
}

/// The cart as displayed: the backend's cart, optimistically patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub lines: Vec<CartLine>,
    /// Sum of line quantities. 0 means the empty-cart state.
    pub total_quantity: u32,
    pub cost: CartCost,
    pub checkout_url: Option<String>,
}

impl Cart {
    /// An empty cart in the given currency.
    pub fn empty(id: impl Into<String>, currency_code: &str) -> Self {
        Self {
            id: id.into(),
            lines: Vec::new(),
            total_quantity: 0,
            cost: CartCost {
                subtotal: Money::zero(currency_code),
            },
            checkout_url: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_quantity == 0
    }

    /// Look up a line by id.
    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Look up a line by its merchandise (variant) id.
    pub fn line_for_merchandise(&self, merchandise_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.merchandise.id == merchandise_id)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
