//! Optimistic client state: confirmed truth plus speculative pending edits.
//!
//! The UI renders [`Optimistic::speculative`] — the last state known to
//! match the backing store with every in-flight mutation folded on top —
//! so edits appear instantly even though every mutation is an async round
//! trip. When a call resolves, the server's aggregate replaces the
//! confirmed state and the entry leaves the queue; when a call fails, the
//! caller re-fetches and resets the machine to authoritative truth rather
//! than attempting field-level rollback.
//!
//! Resolutions can arrive out of order. Each mutation carries a monotonic
//! sequence number, and a success whose sequence is older than the newest
//! one already applied is discarded: last-issued wins, deterministically,
//! with no clock involved.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::types::{LineId, ProductId};
use crate::wishlist::{Wishlist, WishlistItem};

/// Sequence number identifying one in-flight mutation.
pub type Seq = u64;

/// Aggregates that can compute a speculative copy from a pending action.
pub trait Speculate: Clone {
    /// The closed set of mutations the UI can stage.
    type Action: Clone + core::fmt::Debug;

    /// Pure reducer: the same arithmetic the service applies on success.
    #[must_use]
    fn speculate(&self, action: &Self::Action) -> Self;
}

/// Cart mutations the UI can stage before the server confirms them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartAction {
    AddItem { item: CartItem },
    UpdateQuantity { line_id: LineId, quantity: u32 },
    RemoveItem { line_id: LineId },
}

impl Speculate for Cart {
    type Action = CartAction;

    fn speculate(&self, action: &CartAction) -> Self {
        let mut next = self.clone();
        match action {
            CartAction::AddItem { item } => next.merge_line(item.clone()),
            CartAction::UpdateQuantity { line_id, quantity } => {
                next.set_quantity(line_id, *quantity);
            }
            CartAction::RemoveItem { line_id } => next.remove_line(line_id),
        }
        next
    }
}

/// Wishlist mutations the UI can stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WishlistAction {
    Add { item: WishlistItem },
    Remove { product_id: ProductId },
}

impl Speculate for Wishlist {
    type Action = WishlistAction;

    fn speculate(&self, action: &WishlistAction) -> Self {
        let mut next = self.clone();
        match action {
            WishlistAction::Add { item } => {
                next.insert(item.clone());
            }
            WishlistAction::Remove { product_id } => {
                next.remove(*product_id);
            }
        }
        next
    }
}

/// Machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No mutation in flight; speculative equals confirmed.
    Idle,
    /// At least one mutation awaits its resolution.
    Pending,
}

#[derive(Debug, Clone)]
struct PendingMutation<A> {
    seq: Seq,
    action: A,
}

/// Last-known-good state plus the in-flight mutation queue.
#[derive(Debug, Clone)]
pub struct Optimistic<S: Speculate> {
    confirmed: S,
    pending: VecDeque<PendingMutation<S::Action>>,
    issued: Seq,
    applied: Seq,
}

impl<S: Speculate> Optimistic<S> {
    /// Start the machine from a confirmed aggregate.
    #[must_use]
    pub fn new(confirmed: S) -> Self {
        Self {
            confirmed,
            pending: VecDeque::new(),
            issued: 0,
            applied: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.pending.is_empty() {
            Phase::Idle
        } else {
            Phase::Pending
        }
    }

    /// The last state known to match the backing store.
    #[must_use]
    pub const fn confirmed(&self) -> &S {
        &self.confirmed
    }

    /// What the UI renders: confirmed state with every pending mutation
    /// folded on top, oldest first.
    #[must_use]
    pub fn speculative(&self) -> S {
        self.pending
            .iter()
            .fold(self.confirmed.clone(), |state, mutation| {
                state.speculate(&mutation.action)
            })
    }

    /// Stage a mutation and return the sequence number to resolve it with.
    pub fn begin(&mut self, action: S::Action) -> Seq {
        self.issued += 1;
        self.pending.push_back(PendingMutation {
            seq: self.issued,
            action,
        });
        self.issued
    }

    /// Resolve a mutation with the aggregate the server returned.
    ///
    /// The entry leaves the queue; the aggregate replaces confirmed state
    /// unless a newer resolution already did, in which case the stale
    /// result is discarded.
    pub fn resolve_success(&mut self, seq: Seq, authoritative: S) {
        self.pending.retain(|mutation| mutation.seq != seq);
        if seq > self.applied {
            self.confirmed = authoritative;
            self.applied = seq;
        }
    }

    /// Resolve a failed mutation with re-fetched authoritative state.
    ///
    /// Every pending edit is dropped — the re-read is simpler and always
    /// correct — and late resolutions of anything issued so far will be
    /// treated as stale.
    pub fn resolve_failure(&mut self, _seq: Seq, refetched: S) {
        self.pending.clear();
        self.confirmed = refetched;
        self.applied = self.issued;
    }

    /// Replace confirmed state wholesale, e.g. after the sign-in merge
    /// forces a re-fetch. Pending edits are dropped.
    pub fn reset(&mut self, authoritative: S) {
        self.pending.clear();
        self.confirmed = authoritative;
        self.applied = self.issued;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductSnapshot;
    use rust_decimal::Decimal;

    fn snapshot(id: i32, price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            unit_price: Decimal::from(price),
            discount_price: None,
            unit: "kg".to_owned(),
            stock,
            minimum_order: None,
            image_url: None,
            farm_name: None,
        }
    }

    #[test]
    fn test_speculative_renders_pending_add_immediately() {
        let mut machine = Optimistic::new(Cart::default());
        assert_eq!(machine.phase(), Phase::Idle);

        machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&snapshot(1, 4, 10), 2),
        });

        assert_eq!(machine.phase(), Phase::Pending);
        assert!(machine.confirmed().is_empty());
        let speculative = machine.speculative();
        assert_eq!(speculative.total_items, 2);
        assert_eq!(speculative.subtotal, Decimal::from(8));
    }

    #[test]
    fn test_success_collapses_speculative_to_confirmed() {
        let mut machine = Optimistic::new(Cart::default());
        let seq = machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&snapshot(1, 4, 10), 2),
        });

        let server_cart = Cart::from_items(vec![CartItem::from_snapshot(&snapshot(1, 4, 10), 2)]);
        machine.resolve_success(seq, server_cart.clone());

        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.confirmed(), &server_cart);
        assert_eq!(machine.speculative(), server_cart);
    }

    #[test]
    fn test_failure_resyncs_to_refetched_truth() {
        let confirmed = Cart::from_items(vec![CartItem::from_snapshot(&snapshot(1, 4, 10), 1)]);
        let mut machine = Optimistic::new(confirmed.clone());
        let seq = machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&snapshot(2, 9, 10), 5),
        });
        assert_eq!(machine.speculative().items.len(), 2);

        // The mutation is rejected server-side; the caller re-fetches.
        machine.resolve_failure(seq, confirmed.clone());

        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.speculative(), confirmed);
    }

    #[test]
    fn test_stale_success_does_not_overwrite_newer_resolution() {
        let product = snapshot(1, 4, 20);
        let mut machine = Optimistic::new(Cart::default());

        let first = machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&product, 2),
        });
        let second = machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&product, 3),
        });

        let after_both = Cart::from_items(vec![CartItem::from_snapshot(&product, 5)]);
        machine.resolve_success(second, after_both.clone());

        // The first request's response arrives late, carrying older truth.
        let after_first = Cart::from_items(vec![CartItem::from_snapshot(&product, 2)]);
        machine.resolve_success(first, after_first);

        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.confirmed(), &after_both);
    }

    #[test]
    fn test_late_success_after_failure_reset_is_stale() {
        let product = snapshot(1, 4, 20);
        let mut machine = Optimistic::new(Cart::default());

        let first = machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&product, 2),
        });
        let second = machine.begin(CartAction::UpdateQuantity {
            line_id: LineId::local(),
            quantity: 4,
        });

        // Second mutation fails; machine resyncs to the re-fetched cart.
        let refetched = Cart::from_items(vec![CartItem::from_snapshot(&product, 1)]);
        machine.resolve_failure(second, refetched.clone());

        // First mutation's success lands afterwards and must not win.
        machine.resolve_success(first, Cart::default());
        assert_eq!(machine.confirmed(), &refetched);
    }

    #[test]
    fn test_reset_after_sign_in_merge_drops_pending_edits() {
        let product = snapshot(1, 4, 20);
        let mut machine = Optimistic::new(Cart::default());
        machine.begin(CartAction::AddItem {
            item: CartItem::from_snapshot(&product, 2),
        });

        // Sign-in merge forces a re-fetch of the account cart.
        let merged = Cart::from_items(vec![CartItem::from_snapshot(&product, 7)]);
        machine.reset(merged.clone());

        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.speculative(), merged);
    }

    #[test]
    fn test_wishlist_speculation_is_set_semantics() {
        let mut machine = Optimistic::new(Wishlist::default());
        let item = WishlistItem::from_snapshot(&snapshot(1, 4, 10));

        machine.begin(WishlistAction::Add { item: item.clone() });
        machine.begin(WishlistAction::Add { item });
        assert_eq!(machine.speculative().items.len(), 1);

        machine.begin(WishlistAction::Remove {
            product_id: ProductId::new(1),
        });
        assert!(machine.speculative().is_empty());
    }
}
