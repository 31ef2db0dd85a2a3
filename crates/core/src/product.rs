//! Product snapshot read model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Display fields for one product, re-read from the catalog on every use.
///
/// Cart and wishlist lines never copy price or stock into their own rows;
/// this snapshot is joined in at read time, so repricing and stock
/// depletion surface on the very next read without an invalidation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    /// Regular unit price.
    pub unit_price: Decimal,
    /// Promotional price, when one is currently set.
    pub discount_price: Option<Decimal>,
    /// Sale unit (e.g. "kg", "bunch", "dozen").
    pub unit: String,
    /// Units currently available.
    pub stock: u32,
    /// Smallest quantity the farm will sell, if any.
    pub minimum_order: Option<u32>,
    /// First media URL, when the product has media.
    pub image_url: Option<String>,
    /// Name of the farm selling the product.
    pub farm_name: Option<String>,
}

impl ProductSnapshot {
    /// Price a buyer actually pays per unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.unit_price)
    }
}
