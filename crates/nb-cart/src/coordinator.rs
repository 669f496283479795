//! Cart mutation coordinator.
//!
//! # Design
//!
//! The coordinator is the single writer of cart state. It owns:
//!
//! - the **confirmed** cart: the last authoritative snapshot the backend
//!   returned;
//! - the **pending** set: at most one in-flight mutation per coalescing key;
//! - a monotonically increasing submission sequence.
//!
//! `submit` records a mutation and makes it visible immediately through
//! [`CartCoordinator::displayed`]. `complete` reconciles a backend outcome:
//!
//! 1. **Superseded.** If a newer mutation with the same key was submitted
//!    after this one, the outcome is discarded — state does not change. This
//!    is last-SUBMITTED-wins, not last-completed-wins: the user sees the
//!    effect of whatever they did last, regardless of network ordering.
//! 2. **Applied.** An `Ok` cart replaces the confirmed state; the pending
//!    entry (and its optimistic flags) vanish with it.
//! 3. **Failed.** An `Err` clears the pending entry, so the affected lines
//!    revert to the last confirmed state. Failure is scoped to that
//!    mutation; the rest of the cart is untouched.
//!
//! The coordinator is synchronous and lock-free; transport happens outside
//! it. Service layers wrap it in `Arc<RwLock<…>>`, call `submit` before
//! dispatching the backend request and `complete` with the result.

use std::collections::HashMap;

use nb_schemas::Cart;

use crate::action::MutationRequest;
use crate::backend::BackendError;
use crate::project::project;

// ---------------------------------------------------------------------------
// PendingMutation / SubmitTicket
// ---------------------------------------------------------------------------

/// An in-flight mutation, as the projection reducer consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    /// Submission sequence number; projection applies ascending.
    pub seq: u64,
    /// The coalescing key this mutation occupies.
    pub key: String,
    pub request: MutationRequest,
}

/// Handle returned by [`CartCoordinator::submit`]; pass it back to
/// [`CartCoordinator::complete`] with the backend outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub key: String,
    pub seq: u64,
}

/// What `complete` did with a backend outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The authoritative cart was installed.
    Applied,
    /// A newer same-key submission made this outcome stale; it was
    /// discarded. Not an error.
    Superseded,
    /// The backend failed; the affected lines reverted to confirmed state.
    Failed(BackendError),
}

impl Completion {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Completion::Superseded)
    }
}

// ---------------------------------------------------------------------------
// CartCoordinator
// ---------------------------------------------------------------------------

/// Coordinates concurrent cart line mutations. See the module docs for the
/// full contract.
#[derive(Debug, Clone)]
pub struct CartCoordinator {
    confirmed: Cart,
    /// Ascending by `seq`; invariant: at most one entry per key.
    pending: Vec<PendingMutation>,
    /// key → newest submitted seq for that key.
    latest: HashMap<String, u64>,
    next_seq: u64,
}

impl CartCoordinator {
    /// Start coordinating from a backend-confirmed cart.
    pub fn new(confirmed: Cart) -> Self {
        Self {
            confirmed,
            pending: Vec::new(),
            latest: HashMap::new(),
            next_seq: 0,
        }
    }

    /// The last backend-confirmed cart.
    pub fn confirmed(&self) -> &Cart {
        &self.confirmed
    }

    /// The cart as the user should see it right now: confirmed state patched
    /// by every pending mutation.
    pub fn displayed(&self) -> Cart {
        project(&self.confirmed, &self.pending)
    }

    /// Number of mutations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Record a mutation and make it visible optimistically.
    ///
    /// If a mutation with the same coalescing key is already pending, it is
    /// replaced: its eventual backend response will be discarded as
    /// superseded.
    pub fn submit(&mut self, request: MutationRequest) -> SubmitTicket {
        let key = request.coalescing_key();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.pending.retain(|p| p.key != key);
        self.pending.push(PendingMutation {
            seq,
            key: key.clone(),
            request,
        });
        self.latest.insert(key.clone(), seq);

        SubmitTicket { key, seq }
    }

    /// Reconcile a backend outcome for a previously submitted mutation.
    pub fn complete(
        &mut self,
        ticket: &SubmitTicket,
        outcome: Result<Cart, BackendError>,
    ) -> Completion {
        // A response is only applicable while its ticket is still the newest
        // submission for its key. Anything else — an older superseded ticket,
        // or a duplicate completion — is discarded.
        match self.latest.get(&ticket.key) {
            Some(&newest) if newest == ticket.seq => {}
            _ => return Completion::Superseded,
        }

        self.pending.retain(|p| p.seq != ticket.seq);
        self.latest.remove(&ticket.key);

        match outcome {
            Ok(cart) => {
                self.confirmed = cart;
                Completion::Applied
            }
            Err(err) => Completion::Failed(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
