//! Wishlist service.
//!
//! Same backend duality as the cart service, without quantity or stock
//! concerns — membership is boolean and adds are idempotent.

use thiserror::Error;

use farmgate_core::{ProductId, Wishlist, WishlistItem};

use crate::db::{RepositoryError, SnapshotResolver};
use crate::stores::WishlistStore;

/// Errors from wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// The product does not exist (or no longer exists).
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Wishlist operations over an explicit resolver and store backend.
pub struct WishlistService<R, S> {
    catalog: R,
    store: S,
}

impl<R: SnapshotResolver, S: WishlistStore> WishlistService<R, S> {
    /// Create a service over the given backend.
    pub const fn new(catalog: R, store: S) -> Self {
        Self { catalog, store }
    }

    /// Read the current wishlist.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the store read fails.
    pub async fn get(&self) -> Result<Wishlist, WishlistError> {
        Ok(self.store.read().await?)
    }

    /// Add a product. Adding one that is already wished for is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ProductNotFound` if the product does not
    /// exist, or `WishlistError::Repository` on store failure.
    pub async fn add(&self, product_id: ProductId) -> Result<Wishlist, WishlistError> {
        let wishlist = self.store.read().await?;
        if wishlist.contains(product_id) {
            return Ok(wishlist);
        }

        let snapshot = self
            .catalog
            .snapshot(product_id)
            .await?
            .ok_or(WishlistError::ProductNotFound(product_id))?;

        self.store
            .upsert(&WishlistItem::from_snapshot(&snapshot))
            .await?;

        Ok(self.store.read().await?)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the store delete or read fails.
    pub async fn remove(&self, product_id: ProductId) -> Result<Wishlist, WishlistError> {
        self.store.delete(product_id).await?;
        Ok(self.store.read().await?)
    }
}
