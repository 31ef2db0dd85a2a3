//! Cart service.
//!
//! Every operation returns the full, recomputed cart read back from the
//! store — callers replace their entire local copy rather than patching
//! deltas, which keeps the optimistic client trivially convergent.

use thiserror::Error;

use farmgate_core::{Cart, CartItem, LineId, ProductId};

use crate::db::{RepositoryError, SnapshotResolver};
use crate::stores::CartStore;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist (or no longer exists).
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The requested quantity surpasses current stock; nothing was written.
    #[error("only {available} in stock")]
    StockExceeded {
        /// Units currently available.
        available: u32,
    },

    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cart operations over an explicit snapshot resolver and store backend.
pub struct CartService<R, S> {
    catalog: R,
    store: S,
}

impl<R: SnapshotResolver, S: CartStore> CartService<R, S> {
    /// Create a service over the given backend.
    pub const fn new(catalog: R, store: S) -> Self {
        Self { catalog, store }
    }

    /// Read the current cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store read fails.
    pub async fn get(&self) -> Result<Cart, CartError> {
        Ok(self.store.read().await?)
    }

    /// Add a quantity of a product, accumulating onto any existing line.
    ///
    /// The accumulated quantity is validated against current stock before
    /// anything is written; on rejection the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product does not exist,
    /// `CartError::StockExceeded` if the accumulated quantity surpasses
    /// stock, or `CartError::Repository` on store failure.
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<Cart, CartError> {
        let quantity = quantity.max(1);
        let snapshot = self
            .catalog
            .snapshot(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let cart = self.store.read().await?;
        let (id, new_quantity) = match cart.find_by_product(product_id) {
            Some(line) => (line.id, line.quantity.saturating_add(quantity)),
            None => (LineId::local(), quantity),
        };

        if new_quantity > snapshot.stock {
            return Err(CartError::StockExceeded {
                available: snapshot.stock,
            });
        }

        let mut item = CartItem::from_snapshot(&snapshot, new_quantity);
        item.id = id;
        self.store.upsert(&item).await?;

        Ok(self.store.read().await?)
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the line's product vanished,
    /// `CartError::StockExceeded` if the quantity surpasses stock, or
    /// `CartError::Repository` on store failure.
    pub async fn update_quantity(
        &self,
        line_id: &LineId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        let Ok(quantity) = u32::try_from(quantity) else {
            return self.remove(line_id).await;
        };
        if quantity == 0 {
            return self.remove(line_id).await;
        }

        let cart = self.store.read().await?;
        let Some(line) = cart.find_line(line_id) else {
            // Stale client state; current truth is the best answer.
            return Ok(cart);
        };

        let product_id = line.product_id;
        let snapshot = self
            .catalog
            .snapshot(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        if quantity > snapshot.stock {
            return Err(CartError::StockExceeded {
                available: snapshot.stock,
            });
        }

        let mut item = CartItem::from_snapshot(&snapshot, quantity);
        item.id = line.id;
        self.store.upsert(&item).await?;

        Ok(self.store.read().await?)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store delete or read fails.
    pub async fn remove(&self, line_id: &LineId) -> Result<Cart, CartError> {
        self.store.delete(line_id).await?;
        Ok(self.store.read().await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::testing::{MemoryCartStore, MemoryCatalog, SnapshotExt, snapshot};

    fn service<'a>(
        catalog: &'a MemoryCatalog,
        store: &'a MemoryCartStore,
    ) -> CartService<&'a MemoryCatalog, &'a MemoryCartStore> {
        CartService::new(catalog, store)
    }

    #[tokio::test]
    async fn test_add_accumulates_onto_one_line() {
        let catalog = MemoryCatalog::new([snapshot(1, 4, 100)]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        service.add(ProductId::new(1), 2).await.expect("first add");
        let cart = service.add(ProductId::new(1), 3).await.expect("second add");

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|line| line.quantity), Some(5));
        assert_eq!(cart.subtotal, Decimal::from(20));
    }

    #[tokio::test]
    async fn test_add_rejects_quantity_beyond_stock() {
        let catalog = MemoryCatalog::new([snapshot(1, 4, 4)]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        service.add(ProductId::new(1), 2).await.expect("fits stock");
        let err = service.add(ProductId::new(1), 3).await.expect_err("over stock");

        assert!(matches!(err, CartError::StockExceeded { available: 4 }));
        // No partial update happened.
        let cart = service.get().await.expect("get");
        assert_eq!(cart.items.first().map(|line| line.quantity), Some(2));
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let catalog = MemoryCatalog::new([]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        let err = service.add(ProductId::new(9), 1).await.expect_err("missing");
        assert!(matches!(err, CartError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_zero_and_negative_quantity_remove_the_line() {
        let catalog = MemoryCatalog::new([snapshot(1, 4, 100), snapshot(2, 6, 100)]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        let cart = service.add(ProductId::new(1), 2).await.expect("add");
        let first = cart.items.first().map(|line| line.id).expect("line");
        let cart = service.add(ProductId::new(2), 1).await.expect("add");
        let second = cart
            .items
            .iter()
            .find(|line| line.product_id == ProductId::new(2))
            .map(|line| line.id)
            .expect("line");

        let cart = service.update_quantity(&first, 0).await.expect("zero");
        assert!(cart.find_line(&first).is_none());

        let cart = service.update_quantity(&second, -3).await.expect("negative");
        assert!(cart.find_line(&second).is_none());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_validates_stock() {
        let catalog = MemoryCatalog::new([snapshot(1, 4, 5)]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        let cart = service.add(ProductId::new(1), 2).await.expect("add");
        let line = cart.items.first().map(|item| item.id).expect("line");

        let err = service
            .update_quantity(&line, 6)
            .await
            .expect_err("over stock");
        assert!(matches!(err, CartError::StockExceeded { available: 5 }));

        let cart = service.update_quantity(&line, 5).await.expect("at stock");
        assert_eq!(cart.items.first().map(|item| item.quantity), Some(5));
    }

    #[tokio::test]
    async fn test_update_quantity_unknown_line_returns_current_cart() {
        let catalog = MemoryCatalog::new([snapshot(1, 4, 100)]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        service.add(ProductId::new(1), 2).await.expect("add");
        let cart = service
            .update_quantity(&LineId::local(), 7)
            .await
            .expect("no-op");

        assert_eq!(cart.items.first().map(|item| item.quantity), Some(2));
    }

    #[tokio::test]
    async fn test_totals_follow_every_mutation() {
        let catalog = MemoryCatalog::new([
            snapshot(1, 10, 100).with_discount(Decimal::new(75, 1)),
            snapshot(2, 5, 100),
        ]);
        let store = MemoryCartStore::guest();
        let service = service(&catalog, &store);

        service.add(ProductId::new(1), 2).await.expect("add");
        let cart = service.add(ProductId::new(2), 3).await.expect("add");

        // {10, discount 7.5} x2 + {5} x3 = 30
        assert_eq!(cart.subtotal, Decimal::from(30));
        assert_eq!(cart.total_items, 5);

        let line = cart
            .items
            .iter()
            .find(|item| item.product_id == ProductId::new(2))
            .map(|item| item.id)
            .expect("line");
        let cart = service.remove(&line).await.expect("remove");
        assert_eq!(cart.subtotal, Decimal::from(15));
        assert_eq!(cart.total_items, 2);
    }
}
