//! Optimistic cart projection — a pure reducer.
//!
//! `project(confirmed, pending) -> displayed` applies the pending mutations,
//! in submission order, on top of the last backend-confirmed cart. It touches
//! no I/O and no shared state, so it is callable (and testable) with nothing
//! but values.
//!
//! Affected lines come out flagged `optimistic`; totals are recomputed from
//! the resulting lines.

use nb_schemas::{Amount, Cart, CartLine, Merchandise, Money};

use crate::action::MutationRequest;
use crate::coordinator::PendingMutation;

/// Prefix for line ids synthesized before the backend has assigned one.
const OPTIMISTIC_ID_PREFIX: &str = "optimistic-";

/// Derive the placeholder id for a not-yet-confirmed line.
///
/// Deterministic in the merchandise id, so a later confirmation for the same
/// variant replaces the placeholder.
pub fn optimistic_line_id(merchandise_id: &str) -> String {
    format!("{OPTIMISTIC_ID_PREFIX}{merchandise_id}")
}

/// True if `id` was synthesized by [`optimistic_line_id`].
pub fn is_optimistic_line_id(id: &str) -> bool {
    id.starts_with(OPTIMISTIC_ID_PREFIX)
}

/// Project the displayed cart: `confirmed` patched by `pending`, oldest
/// submission first.
///
/// The confirmed input is never mutated. Unknown line ids in a pending
/// mutation are skipped — the backend response will say what actually
/// happened to them.
pub fn project(confirmed: &Cart, pending: &[PendingMutation]) -> Cart {
    let mut cart = confirmed.clone();

    let mut ordered: Vec<&PendingMutation> = pending.iter().collect();
    ordered.sort_by_key(|p| p.seq);

    for p in ordered {
        apply_request(&mut cart, &p.request);
    }

    recompute_totals(&mut cart);
    cart
}

fn apply_request(cart: &mut Cart, request: &MutationRequest) {
    match request {
        MutationRequest::UpdateLines { lines } => {
            for update in lines {
                if update.quantity == 0 {
                    // Quantity zero is a removal.
                    cart.lines.retain(|l| l.id != update.id);
                    continue;
                }
                if let Some(line) = cart.lines.iter_mut().find(|l| l.id == update.id) {
                    line.quantity = update.quantity;
                    line.cost = line_cost(&line.merchandise, update.quantity);
                    line.optimistic = true;
                }
            }
        }
        MutationRequest::RemoveLines { line_ids } => {
            cart.lines.retain(|l| !line_ids.contains(&l.id));
        }
        MutationRequest::AddLines { lines } => {
            for add in lines {
                match cart
                    .lines
                    .iter_mut()
                    .find(|l| l.merchandise.id == add.merchandise.id)
                {
                    // Adding a variant already in the cart merges quantities.
                    Some(line) => {
                        line.quantity += add.quantity;
                        line.cost = line_cost(&line.merchandise, line.quantity);
                        line.optimistic = true;
                    }
                    None => {
                        let quantity = add.quantity.max(1);
                        cart.lines.push(CartLine {
                            id: optimistic_line_id(&add.merchandise.id),
                            cost: line_cost(&add.merchandise, quantity),
                            merchandise: add.merchandise.clone(),
                            quantity,
                            optimistic: true,
                        });
                    }
                }
            }
        }
    }
}

/// Unit price × quantity. An unparseable platform amount keeps the unit
/// price instead of failing the projection.
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

/// Recompute `total_quantity` and the subtotal from the current lines.
fn recompute_totals(cart: &mut Cart) {
    cart.total_quantity = cart.lines.iter().map(|l| l.quantity).sum();

    let currency = cart
        .lines
        .first()
        .map(|l| l.cost.currency_code.clone())
        .unwrap_or_else(|| cart.cost.subtotal.currency_code.clone());

    let mut subtotal = Amount::ZERO;
    for line in &cart.lines {
        if let Ok(a) = line.cost.to_amount() {
            subtotal = subtotal.saturating_add(a);
        }
    }
    cart.cost.subtotal = Money::from_amount(subtotal, currency);
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
