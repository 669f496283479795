//! Cart actions, mutation requests, and coalescing keys.
//!
//! A coalescing key groups mutations that cancel/supersede one another:
//! submitting a mutation whose key matches one already in flight makes the
//! older one stale — only the most-recently-submitted result for a key is
//! ever applied.
//!
//! # Key construction
//!
//! The key is the action's string form joined with the target identifiers in
//! caller order, `-`-delimited:
//!
//! ```text
//! LinesUpdate-line-1
//! LinesAdd-gid://shop/ProductVariant/42
//! ```
//!
//! Two quirks are deliberate, carried over from the storefront this layer
//! fronts:
//! - identifier ORDER matters: the same id set in a different order yields a
//!   different key, so those requests do not coalesce;
//! - a remove derives its key with the **update** action, so a remove and a
//!   quantity update targeting the same line supersede each other (clicking
//!   "remove" right after "+" must win).

use nb_schemas::Merchandise;
use serde::{Deserialize, Serialize};

/// Delimiter between the action name and each identifier in a key.
pub const KEY_DELIMITER: &str = "-";

// ---------------------------------------------------------------------------
// CartAction
// ---------------------------------------------------------------------------

/// The three line-mutation kinds the commerce backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartAction {
    LinesAdd,
    LinesUpdate,
    LinesRemove,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::LinesAdd => "LinesAdd",
            CartAction::LinesUpdate => "LinesUpdate",
            CartAction::LinesRemove => "LinesRemove",
        }
    }
}

impl std::fmt::Display for CartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// coalescing_key
// ---------------------------------------------------------------------------

/// Build the coalescing key for `action` over `ids`, in the given order.
///
/// Pure and deterministic: same inputs, same key, always. Callers MUST pass
/// ids in a stable order for a given logical target set — ids in a different
/// order produce a different key and the requests will not coalesce.
pub fn coalescing_key<I, S>(action: CartAction, ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = action.as_str().to_string();
    for id in ids {
        key.push_str(KEY_DELIMITER);
        key.push_str(id.as_ref());
    }
    key
}

// ---------------------------------------------------------------------------
// MutationRequest
// ---------------------------------------------------------------------------

/// One line to add: the full merchandise (needed to render the optimistic
/// line before the backend has confirmed it) plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddLineInput {
    pub merchandise: Merchandise,
    pub quantity: u32,
}

/// One line quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdateInput {
    pub id: String,
    pub quantity: u32,
}

/// A cart mutation as submitted by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MutationRequest {
    AddLines { lines: Vec<AddLineInput> },
    UpdateLines { lines: Vec<LineUpdateInput> },
    RemoveLines { line_ids: Vec<String> },
}

impl MutationRequest {
    pub fn action(&self) -> CartAction {
        match self {
            MutationRequest::AddLines { .. } => CartAction::LinesAdd,
            MutationRequest::UpdateLines { .. } => CartAction::LinesUpdate,
            MutationRequest::RemoveLines { .. } => CartAction::LinesRemove,
        }
    }

    /// Derive this request's coalescing key.
    ///
    /// Adds key on merchandise ids (the lines do not exist yet). Updates key
    /// on line ids. Removes ALSO key with [`CartAction::LinesUpdate`] so they
    /// supersede in-flight quantity updates on the same lines.
    pub fn coalescing_key(&self) -> String {
        match self {
            MutationRequest::AddLines { lines } => coalescing_key(
                CartAction::LinesAdd,
                lines.iter().map(|l| l.merchandise.id.as_str()),
            ),
            MutationRequest::UpdateLines { lines } => {
                coalescing_key(CartAction::LinesUpdate, lines.iter().map(|l| l.id.as_str()))
            }
            MutationRequest::RemoveLines { line_ids } => {
                coalescing_key(CartAction::LinesUpdate, line_ids.iter())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
