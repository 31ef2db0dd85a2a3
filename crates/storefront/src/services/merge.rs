//! Sign-in reconciliation of guest state into account state.
//!
//! Runs exactly once per sign-in transition, from the login and register
//! handlers. The merge is loop-and-continue, never transactional: an item
//! that cannot be folded in (product deleted, row error) is logged and
//! skipped while the rest proceed, and the guest slot is cleared at the
//! end regardless. Because an empty guest slot short-circuits immediately,
//! a double-fired sign-in event cannot double-merge.

use sqlx::PgPool;
use tower_sessions::Session;

use farmgate_core::{Cart, CartItem, ProductId, UserId, Wishlist, WishlistItem};

use crate::db::{DbCartStore, DbWishlistStore, ProductCatalog, RepositoryError, SnapshotResolver};
use crate::stores::{CartStore, GuestCartStore, GuestWishlistStore, WishlistStore};

/// What happened to one guest item during a merge.
#[derive(Debug)]
pub enum MergeOutcome {
    /// The guest item created a new account line.
    Inserted { product_id: ProductId, quantity: u32 },
    /// The guest quantity was added onto an existing account line.
    Accumulated { product_id: ProductId, quantity: u32 },
    /// The combined quantity was reduced to the available stock.
    Clamped {
        product_id: ProductId,
        quantity: u32,
        available: u32,
    },
    /// The account already had the entry (wishlist merge).
    AlreadyPresent { product_id: ProductId },
    /// The item could not be merged and was skipped.
    Skipped { product_id: ProductId, reason: String },
}

/// Per-item results of one merge pass.
#[derive(Debug, Default)]
pub struct MergeReport {
    pub outcomes: Vec<MergeOutcome>,
}

impl MergeReport {
    /// Number of guest items that made it into the account state.
    #[must_use]
    pub fn merged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome,
                    MergeOutcome::Inserted { .. }
                        | MergeOutcome::Accumulated { .. }
                        | MergeOutcome::Clamped { .. }
                )
            })
            .count()
    }

    /// Number of guest items that were skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, MergeOutcome::Skipped { .. }))
            .count()
    }

    /// Whether the merge had nothing to do.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Fold a guest cart into an account cart.
///
/// Quantities accumulate per product and are clamped to current stock —
/// a merge must never oversell, even when the clamp makes the result
/// differ from the naive sum.
///
/// # Errors
///
/// Returns `RepositoryError` only when the account cart cannot be read at
/// all; per-item failures are recorded in the report instead.
pub async fn merge_carts<R, G, A>(
    catalog: &R,
    guest: &G,
    account: &A,
) -> Result<MergeReport, RepositoryError>
where
    R: SnapshotResolver,
    G: CartStore,
    A: CartStore,
{
    let guest_cart = guest.read().await?;
    if guest_cart.is_empty() {
        return Ok(MergeReport::default());
    }

    let account_cart = account.read().await?;
    let mut report = MergeReport::default();

    for item in guest_cart.items {
        let product_id = item.product_id;
        let snapshot = match catalog.snapshot(product_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::warn!(%product_id, "skipping guest cart line: product no longer exists");
                report.outcomes.push(MergeOutcome::Skipped {
                    product_id,
                    reason: "product no longer exists".to_owned(),
                });
                continue;
            }
            Err(e) => {
                tracing::warn!(%product_id, "skipping guest cart line: {e}");
                report.outcomes.push(MergeOutcome::Skipped {
                    product_id,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let existing = account_cart
            .find_by_product(product_id)
            .map_or(0, |line| line.quantity);
        let requested = existing.saturating_add(item.quantity);
        let quantity = requested.min(snapshot.stock);
        if quantity == 0 {
            tracing::warn!(%product_id, "skipping guest cart line: out of stock");
            report.outcomes.push(MergeOutcome::Skipped {
                product_id,
                reason: "out of stock".to_owned(),
            });
            continue;
        }

        // The account side re-keys the line by product; the guest line ID
        // does not survive this boundary.
        let line = CartItem::from_snapshot(&snapshot, quantity);
        match account.upsert(&line).await {
            Ok(()) => {
                let outcome = if quantity < requested {
                    MergeOutcome::Clamped {
                        product_id,
                        quantity,
                        available: snapshot.stock,
                    }
                } else if existing > 0 {
                    MergeOutcome::Accumulated {
                        product_id,
                        quantity,
                    }
                } else {
                    MergeOutcome::Inserted {
                        product_id,
                        quantity,
                    }
                };
                report.outcomes.push(outcome);
            }
            Err(e) => {
                tracing::warn!(%product_id, "failed to merge guest cart line: {e}");
                report.outcomes.push(MergeOutcome::Skipped {
                    product_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    if let Err(e) = guest.clear().await {
        tracing::warn!("failed to clear guest cart after merge: {e}");
    }

    Ok(report)
}

/// Fold a guest wishlist into an account wishlist.
///
/// Insert-if-absent per product; duplicates are recorded, not errors.
///
/// # Errors
///
/// Returns `RepositoryError` only when the account wishlist cannot be
/// read; per-item failures are recorded in the report instead.
pub async fn merge_wishlists<R, G, A>(
    catalog: &R,
    guest: &G,
    account: &A,
) -> Result<MergeReport, RepositoryError>
where
    R: SnapshotResolver,
    G: WishlistStore,
    A: WishlistStore,
{
    let guest_wishlist = guest.read().await?;
    if guest_wishlist.is_empty() {
        return Ok(MergeReport::default());
    }

    let account_wishlist = account.read().await?;
    let mut report = MergeReport::default();

    for item in guest_wishlist.items {
        let product_id = item.product_id;
        if account_wishlist.contains(product_id) {
            report
                .outcomes
                .push(MergeOutcome::AlreadyPresent { product_id });
            continue;
        }

        let snapshot = match catalog.snapshot(product_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::warn!(%product_id, "skipping guest wishlist entry: product no longer exists");
                report.outcomes.push(MergeOutcome::Skipped {
                    product_id,
                    reason: "product no longer exists".to_owned(),
                });
                continue;
            }
            Err(e) => {
                tracing::warn!(%product_id, "skipping guest wishlist entry: {e}");
                report.outcomes.push(MergeOutcome::Skipped {
                    product_id,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match account.upsert(&WishlistItem::from_snapshot(&snapshot)).await {
            Ok(()) => report.outcomes.push(MergeOutcome::Inserted {
                product_id,
                quantity: 1,
            }),
            Err(e) => {
                tracing::warn!(%product_id, "failed to merge guest wishlist entry: {e}");
                report.outcomes.push(MergeOutcome::Skipped {
                    product_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    if let Err(e) = guest.clear().await {
        tracing::warn!("failed to clear guest wishlist after merge: {e}");
    }

    Ok(report)
}

/// Run both reconcilers for a fresh sign-in, then re-read authoritative
/// state for the response — the client replaces its entire local copy.
///
/// # Errors
///
/// Returns `RepositoryError` if the account state cannot be read.
pub async fn reconcile_sign_in(
    pool: &PgPool,
    session: &Session,
    user_id: UserId,
) -> Result<(Cart, Wishlist), RepositoryError> {
    let catalog = ProductCatalog::new(pool);

    let guest_cart = GuestCartStore::new(session.clone());
    let account_cart = DbCartStore::new(pool, user_id);
    let cart_report = merge_carts(&catalog, &guest_cart, &account_cart).await?;
    if !cart_report.is_noop() {
        tracing::info!(
            %user_id,
            merged = cart_report.merged(),
            skipped = cart_report.skipped(),
            "merged guest cart into account"
        );
    }

    let guest_wishlist = GuestWishlistStore::new(session.clone());
    let account_wishlist = DbWishlistStore::new(pool, user_id);
    let wishlist_report = merge_wishlists(&catalog, &guest_wishlist, &account_wishlist).await?;
    if !wishlist_report.is_noop() {
        tracing::info!(
            %user_id,
            merged = wishlist_report.merged(),
            skipped = wishlist_report.skipped(),
            "merged guest wishlist into account"
        );
    }

    let cart = account_cart.read().await?;
    let wishlist = account_wishlist.read().await?;
    Ok((cart, wishlist))
}
