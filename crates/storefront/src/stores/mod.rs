//! Cart and wishlist persistence capabilities.
//!
//! Each aggregate has exactly two backends: the guest store (browser
//! session slot, no identity) and the account store (rows keyed by user).
//! Services are written against these traits and receive the backend
//! explicitly — which one a request uses is decided once, in the handler,
//! from the presence of a signed-in user in the session.
//!
//! Stores are deliberately dumb: `upsert` writes the absolute state the
//! service already computed (accumulation, stock checks, and zero-removes
//! all happen above this seam).

pub mod guest;

pub use guest::{GuestCartStore, GuestWishlistStore};

use farmgate_core::{Cart, CartItem, LineId, ProductId, Wishlist, WishlistItem};

use crate::db::RepositoryError;

/// Persistence capability for one cart.
pub trait CartStore {
    /// Read the full cart. Guest reads never fail; account reads join the
    /// current product snapshots and silently drop lines whose product no
    /// longer exists.
    fn read(&self) -> impl Future<Output = Result<Cart, RepositoryError>> + Send;

    /// Insert or replace the line for `item.product_id` with the given
    /// absolute quantity.
    fn upsert(&self, item: &CartItem) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a line by identity. IDs of the wrong kind for this backend
    /// are a no-op, not an error.
    fn delete(&self, line_id: &LineId)
    -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete every line.
    fn clear(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl<T: CartStore> CartStore for &T {
    fn read(&self) -> impl Future<Output = Result<Cart, RepositoryError>> + Send {
        T::read(self)
    }

    fn upsert(&self, item: &CartItem) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        T::upsert(self, item)
    }

    fn delete(
        &self,
        line_id: &LineId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        T::delete(self, line_id)
    }

    fn clear(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        T::clear(self)
    }
}

/// Persistence capability for one wishlist.
pub trait WishlistStore {
    /// Read the full wishlist.
    fn read(&self) -> impl Future<Output = Result<Wishlist, RepositoryError>> + Send;

    /// Insert the entry for `item.product_id`; already-present is a no-op.
    fn upsert(
        &self,
        item: &WishlistItem,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete the entry for a product.
    fn delete(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete every entry.
    fn clear(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl<T: WishlistStore> WishlistStore for &T {
    fn read(&self) -> impl Future<Output = Result<Wishlist, RepositoryError>> + Send {
        T::read(self)
    }

    fn upsert(
        &self,
        item: &WishlistItem,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        T::upsert(self, item)
    }

    fn delete(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        T::delete(self, product_id)
    }

    fn clear(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        T::clear(self)
    }
}
