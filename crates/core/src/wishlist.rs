//! Wishlist aggregate.
//!
//! Membership is boolean: one entry per product, no quantity. Adding an
//! already-present product is a no-op by design.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::ProductSnapshot;
use crate::types::ProductId;

/// One wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    /// Effective price (discounted when a discount is set) at read time.
    pub price: Decimal,
    /// Units currently available.
    pub stock: u32,
    pub image_url: Option<String>,
    pub farm_name: Option<String>,
}

impl WishlistItem {
    /// Build an entry from a product snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &ProductSnapshot) -> Self {
        Self {
            product_id: snapshot.id,
            name: snapshot.name.clone(),
            price: snapshot.effective_price(),
            stock: snapshot.stock,
            image_url: snapshot.image_url.clone(),
            farm_name: snapshot.farm_name.clone(),
        }
    }
}

/// Wishlist aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wishlist {
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Whether the wishlist has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a product is already wished for.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    /// Insert an entry. Returns `false` (and changes nothing) when the
    /// product is already present.
    pub fn insert(&mut self, item: WishlistItem) -> bool {
        if self.contains(item.product_id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the entry for a product. Returns whether one was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32) -> WishlistItem {
        WishlistItem {
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            price: Decimal::from(3),
            stock: 10,
            image_url: None,
            farm_name: None,
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut wishlist = Wishlist::default();
        assert!(wishlist.insert(item(1)));
        assert!(!wishlist.insert(item(1)));
        assert_eq!(wishlist.items.len(), 1);
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut wishlist = Wishlist::default();
        wishlist.insert(item(1));
        assert!(wishlist.remove(ProductId::new(1)));
        assert!(!wishlist.remove(ProductId::new(1)));
        assert!(wishlist.is_empty());
    }
}
