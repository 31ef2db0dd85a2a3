//! In-memory doubles for the store and resolver capabilities.
//!
//! Service and merge tests run entirely against these; no database is
//! required for the test suite.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

use rust_decimal::Decimal;

use farmgate_core::{
    Cart, CartItem, CartLineId, LineId, ProductId, ProductSnapshot, Wishlist, WishlistItem,
};

use crate::db::{RepositoryError, SnapshotResolver};
use crate::stores::{CartStore, WishlistStore};

/// Build a plain snapshot for tests.
pub fn snapshot(id: i32, unit_price: i64, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: format!("product-{id}"),
        unit_price: Decimal::from(unit_price),
        discount_price: None,
        unit: "kg".to_owned(),
        stock,
        minimum_order: None,
        image_url: None,
        farm_name: Some("Hilltop Farm".to_owned()),
    }
}

/// Builder-style tweaks for test snapshots.
pub trait SnapshotExt {
    #[must_use]
    fn with_discount(self, discount: Decimal) -> Self;
}

impl SnapshotExt for ProductSnapshot {
    fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount_price = Some(discount);
        self
    }
}

/// Snapshot resolver over a fixed product map.
pub struct MemoryCatalog {
    products: Mutex<HashMap<ProductId, ProductSnapshot>>,
}

impl MemoryCatalog {
    pub fn new(products: impl IntoIterator<Item = ProductSnapshot>) -> Self {
        Self {
            products: Mutex::new(
                products
                    .into_iter()
                    .map(|snapshot| (snapshot.id, snapshot))
                    .collect(),
            ),
        }
    }

    /// Delete a product, as the seller would.
    pub fn delete(&self, product_id: ProductId) {
        self.products.lock().expect("catalog lock").remove(&product_id);
    }
}

impl SnapshotResolver for MemoryCatalog {
    async fn snapshot(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductSnapshot>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .expect("catalog lock")
            .get(&product_id)
            .cloned())
    }
}

/// Cart store over an in-memory aggregate.
///
/// The account flavor assigns `Stored` row IDs on insert, mirroring the
/// database store; the guest flavor keeps local IDs as given.
pub struct MemoryCartStore {
    cart: Mutex<Cart>,
    assign_row_ids: bool,
    next_row_id: AtomicI32,
    fail_upserts_for: Mutex<Vec<ProductId>>,
}

impl MemoryCartStore {
    /// A store that behaves like the guest session slot.
    pub fn guest() -> Self {
        Self {
            cart: Mutex::new(Cart::default()),
            assign_row_ids: false,
            next_row_id: AtomicI32::new(1),
            fail_upserts_for: Mutex::new(Vec::new()),
        }
    }

    /// A store that behaves like the account row table.
    pub fn account() -> Self {
        Self {
            assign_row_ids: true,
            ..Self::guest()
        }
    }

    /// Make upserts for a product fail, simulating a row-level error.
    pub fn fail_upserts_for(&self, product_id: ProductId) {
        self.fail_upserts_for
            .lock()
            .expect("failure list lock")
            .push(product_id);
    }

    /// Seed the store, bypassing service rules.
    pub fn seed(&self, items: Vec<CartItem>) {
        let mut items = items;
        if self.assign_row_ids {
            for item in &mut items {
                item.id = self.next_row_id();
            }
        }
        *self.cart.lock().expect("cart lock") = Cart::from_items(items);
    }

    fn next_row_id(&self) -> LineId {
        LineId::Stored(CartLineId::new(
            self.next_row_id.fetch_add(1, Ordering::Relaxed),
        ))
    }
}

impl CartStore for MemoryCartStore {
    async fn read(&self) -> Result<Cart, RepositoryError> {
        Ok(self.cart.lock().expect("cart lock").clone())
    }

    async fn upsert(&self, item: &CartItem) -> Result<(), RepositoryError> {
        if self
            .fail_upserts_for
            .lock()
            .expect("failure list lock")
            .contains(&item.product_id)
        {
            return Err(RepositoryError::Conflict("simulated failure".to_owned()));
        }

        let mut cart = self.cart.lock().expect("cart lock");
        let mut item = item.clone();
        if self.assign_row_ids && cart.find_by_product(item.product_id).is_none() {
            item.id = self.next_row_id();
        }
        cart.upsert_line(item);
        Ok(())
    }

    async fn delete(&self, line_id: &LineId) -> Result<(), RepositoryError> {
        self.cart.lock().expect("cart lock").remove_line(line_id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        *self.cart.lock().expect("cart lock") = Cart::default();
        Ok(())
    }
}

/// Wishlist store over an in-memory aggregate.
#[derive(Default)]
pub struct MemoryWishlistStore {
    wishlist: Mutex<Wishlist>,
}

impl MemoryWishlistStore {
    /// Seed the store, bypassing service rules.
    pub fn seed(&self, items: Vec<WishlistItem>) {
        *self.wishlist.lock().expect("wishlist lock") = Wishlist { items };
    }
}

impl WishlistStore for MemoryWishlistStore {
    async fn read(&self) -> Result<Wishlist, RepositoryError> {
        Ok(self.wishlist.lock().expect("wishlist lock").clone())
    }

    async fn upsert(&self, item: &WishlistItem) -> Result<(), RepositoryError> {
        self.wishlist
            .lock()
            .expect("wishlist lock")
            .insert(item.clone());
        Ok(())
    }

    async fn delete(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        self.wishlist
            .lock()
            .expect("wishlist lock")
            .remove(product_id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        *self.wishlist.lock().expect("wishlist lock") = Wishlist::default();
        Ok(())
    }
}
