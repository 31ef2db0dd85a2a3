//! Cart aggregate and line arithmetic.
//!
//! A product appears at most once per cart — adds accumulate onto the
//! existing line instead of duplicating it. `subtotal` and `total_items`
//! are derived from `items`; every mutating method recomputes them in the
//! same step, so they are never trusted independently of the lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::ProductSnapshot;
use crate::types::{LineId, ProductId};

/// One cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line identity; local for guest carts, a row ID for account carts.
    pub id: LineId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub discount_price: Option<Decimal>,
    /// Always at least 1; a quantity of zero removes the line instead.
    pub quantity: u32,
    pub unit: String,
    pub minimum_order: Option<u32>,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Build a line from a product snapshot with a fresh local ID.
    #[must_use]
    pub fn from_snapshot(snapshot: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            id: LineId::local(),
            product_id: snapshot.id,
            name: snapshot.name.clone(),
            unit_price: snapshot.unit_price,
            discount_price: snapshot.discount_price,
            quantity: quantity.max(1),
            unit: snapshot.unit.clone(),
            minimum_order: snapshot.minimum_order,
            image_url: snapshot.image_url.clone(),
        }
    }

    /// Price per unit after any discount.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.unit_price)
    }

    /// Line total at the effective price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price() * Decimal::from(self.quantity)
    }
}

/// Cart aggregate with derived totals.
///
/// Deserialization is lenient (`default` on every field) so a partial or
/// damaged persisted document degrades instead of failing; callers that
/// read persisted carts recompute totals right after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub total_items: u32,
}

impl Cart {
    /// Build a cart from lines, computing totals.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            items,
            ..Self::default()
        };
        cart.recompute();
        cart
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line holding a product, if any.
    #[must_use]
    pub fn find_by_product(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Find a line by its identity, if present.
    #[must_use]
    pub fn find_line(&self, id: &LineId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add a line, accumulating quantity onto any existing line for the
    /// same product. The existing line keeps its identity; name, prices,
    /// and media refresh from the incoming line.
    pub fn merge_line(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.name = item.name;
                existing.unit_price = item.unit_price;
                existing.discount_price = item.discount_price;
                existing.unit = item.unit;
                existing.minimum_order = item.minimum_order;
                existing.image_url = item.image_url;
            }
            None => self.items.push(item),
        }
        self.recompute();
    }

    /// Insert or replace the line for a product, keeping the given
    /// quantity as-is. This is the raw store write; accumulation happens
    /// in the service (or in [`Cart::merge_line`]) before calling it.
    pub fn upsert_line(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => {
                let id = existing.id;
                *existing = item;
                existing.id = id;
            }
            None => self.items.push(item),
        }
        self.recompute();
    }

    /// Set the quantity of a line; zero removes it. Unknown IDs are a
    /// no-op so stale client state cannot corrupt the cart.
    pub fn set_quantity(&mut self, id: &LineId, quantity: u32) {
        if quantity == 0 {
            self.remove_line(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.quantity = quantity;
        }
        self.recompute();
    }

    /// Remove a line by identity.
    pub fn remove_line(&mut self, id: &LineId) {
        self.items.retain(|item| &item.id != id);
        self.recompute();
    }

    /// Recompute the derived totals from the lines.
    pub fn recompute(&mut self) {
        self.subtotal = self.items.iter().map(CartItem::line_total).sum();
        self.total_items = self
            .items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CartLineId;

    fn snapshot(id: i32, unit_price: Decimal, discount_price: Option<Decimal>) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            unit_price,
            discount_price,
            unit: "kg".to_owned(),
            stock: 100,
            minimum_order: None,
            image_url: None,
            farm_name: Some("Hilltop Farm".to_owned()),
        }
    }

    #[test]
    fn test_repeated_add_accumulates_one_line() {
        let product = snapshot(1, Decimal::from(4), None);
        let mut cart = Cart::default();
        cart.merge_line(CartItem::from_snapshot(&product, 2));
        cart.merge_line(CartItem::from_snapshot(&product, 3));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|item| item.quantity), Some(5));
        assert_eq!(cart.total_items, 5);
    }

    #[test]
    fn test_accumulation_keeps_existing_line_identity() {
        let product = snapshot(1, Decimal::from(4), None);
        let mut cart = Cart::default();
        cart.merge_line(CartItem::from_snapshot(&product, 2));
        let original_id = cart.items.first().map(|item| item.id).expect("line");

        cart.merge_line(CartItem::from_snapshot(&product, 3));
        assert_eq!(cart.items.first().map(|item| item.id), Some(original_id));
    }

    #[test]
    fn test_subtotal_uses_discount_price_when_present() {
        // {10, discount 7.5} x2 + {5, no discount} x3 = 30
        let mut cart = Cart::default();
        cart.merge_line(CartItem::from_snapshot(
            &snapshot(1, Decimal::from(10), Some(Decimal::new(75, 1))),
            2,
        ));
        cart.merge_line(CartItem::from_snapshot(&snapshot(2, Decimal::from(5), None), 3));

        assert_eq!(cart.subtotal, Decimal::from(30));
        assert_eq!(cart.total_items, 5);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let product = snapshot(1, Decimal::from(4), None);
        let mut cart = Cart::default();
        cart.merge_line(CartItem::from_snapshot(&product, 2));
        let id = cart.items.first().map(|item| item.id).expect("line");

        cart.set_quantity(&id, 0);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal, Decimal::ZERO);
        assert_eq!(cart.total_items, 0);
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let product = snapshot(1, Decimal::from(4), None);
        let mut cart = Cart::default();
        cart.merge_line(CartItem::from_snapshot(&product, 2));

        cart.set_quantity(&LineId::from(CartLineId::new(999)), 7);
        assert_eq!(cart.items.first().map(|item| item.quantity), Some(2));
    }

    #[test]
    fn test_upsert_replaces_quantity_instead_of_accumulating() {
        let product = snapshot(1, Decimal::from(4), None);
        let mut cart = Cart::default();
        cart.upsert_line(CartItem::from_snapshot(&product, 2));
        cart.upsert_line(CartItem::from_snapshot(&product, 9));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|item| item.quantity), Some(9));
    }

    #[test]
    fn test_lenient_deserialization_recovers_partial_documents() {
        let cart: Cart = serde_json::from_str(r#"{"items": []}"#).expect("partial doc");
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal, Decimal::ZERO);
    }
}
