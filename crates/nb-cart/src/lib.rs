//! nb-cart
//!
//! Cart line-mutation coordination for the storefront:
//!
//! - `action` — mutation requests and deterministic coalescing keys
//! - `coordinator` — single-writer submit/complete state with
//!   last-submitted-wins supersession per key
//! - `project` — the pure optimistic-projection reducer
//! - `controls` — quantity-control affordance policy
//! - `backend` — the `CommerceBackend` seam adapters implement
//!
//! The coordinator never talks to the network itself: callers `submit`, make
//! the backend call through a [`CommerceBackend`], then `complete` with the
//! outcome. Stale outcomes (a newer same-key mutation was submitted in the
//! meantime) are discarded, not applied.

mod action;
mod backend;
mod controls;
mod coordinator;
mod project;

pub use action::{
    coalescing_key, AddLineInput, CartAction, LineUpdateInput, MutationRequest, KEY_DELIMITER,
};
pub use backend::{
    resolve_featured_product, AddLinePayload, BackendError, CommerceBackend, ProductReader,
    ShopBackend, UpdateLinePayload,
};
pub use controls::LineControls;
pub use coordinator::{CartCoordinator, Completion, PendingMutation, SubmitTicket};
pub use project::{is_optimistic_line_id, optimistic_line_id, project};
