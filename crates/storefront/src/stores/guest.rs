//! Guest-side persistence over the browser session slot.
//!
//! Anonymous carts and wishlists live as single JSON documents under fixed
//! keys in the visitor's session — scoped to one browser, expiring with it
//! (30 days of inactivity, see `middleware::session`). The contract is
//! strictly best-effort: absent, malformed, or unavailable storage reads as
//! the empty aggregate, and write failures are logged and swallowed. A
//! visitor with storage problems gets an empty cart, never an error page.

use tower_sessions::Session;

use farmgate_core::{Cart, CartItem, LineId, ProductId, Wishlist, WishlistItem};

use super::{CartStore, WishlistStore};
use crate::db::RepositoryError;
use crate::models::session_keys;

/// Guest cart persistence over the session slot.
pub struct GuestCartStore {
    session: Session,
}

impl GuestCartStore {
    /// Create a store over the request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    async fn load(&self) -> Cart {
        // Absent, malformed, and unavailable all degrade to empty; totals
        // are recomputed because the document may predate a price change
        // or have been edited by the client.
        let mut cart = self
            .session
            .get::<Cart>(session_keys::GUEST_CART)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        cart.recompute();
        cart
    }

    async fn persist(&self, cart: &Cart) {
        if let Err(e) = self.session.insert(session_keys::GUEST_CART, cart).await {
            tracing::warn!("failed to persist guest cart: {e}");
        }
    }
}

impl CartStore for GuestCartStore {
    async fn read(&self) -> Result<Cart, RepositoryError> {
        Ok(self.load().await)
    }

    async fn upsert(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let mut cart = self.load().await;
        cart.upsert_line(item.clone());
        self.persist(&cart).await;
        Ok(())
    }

    async fn delete(&self, line_id: &LineId) -> Result<(), RepositoryError> {
        let mut cart = self.load().await;
        cart.remove_line(line_id);
        self.persist(&cart).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        if let Err(e) = self
            .session
            .remove::<Cart>(session_keys::GUEST_CART)
            .await
        {
            tracing::warn!("failed to clear guest cart: {e}");
        }
        Ok(())
    }
}

/// Guest wishlist persistence over the session slot.
pub struct GuestWishlistStore {
    session: Session,
}

impl GuestWishlistStore {
    /// Create a store over the request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    async fn load(&self) -> Wishlist {
        self.session
            .get::<Wishlist>(session_keys::GUEST_WISHLIST)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    async fn persist(&self, wishlist: &Wishlist) {
        if let Err(e) = self
            .session
            .insert(session_keys::GUEST_WISHLIST, wishlist)
            .await
        {
            tracing::warn!("failed to persist guest wishlist: {e}");
        }
    }
}

impl WishlistStore for GuestWishlistStore {
    async fn read(&self) -> Result<Wishlist, RepositoryError> {
        Ok(self.load().await)
    }

    async fn upsert(&self, item: &WishlistItem) -> Result<(), RepositoryError> {
        let mut wishlist = self.load().await;
        wishlist.insert(item.clone());
        self.persist(&wishlist).await;
        Ok(())
    }

    async fn delete(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        let mut wishlist = self.load().await;
        if wishlist.remove(product_id) {
            self.persist(&wishlist).await;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        if let Err(e) = self
            .session
            .remove::<Wishlist>(session_keys::GUEST_WISHLIST)
            .await
        {
            tracing::warn!("failed to clear guest wishlist: {e}");
        }
        Ok(())
    }
}
