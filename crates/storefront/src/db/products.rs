//! Product snapshot resolution.
//!
//! Cart and wishlist reads join every line to its current product record,
//! so price changes and stock depletion are reflected immediately. Nothing
//! here is cached for the same reason.

use rust_decimal::Decimal;
use sqlx::PgPool;

use farmgate_core::{ProductId, ProductSnapshot};

use super::RepositoryError;

/// Read-side capability for resolving product display data.
///
/// Implemented by [`ProductCatalog`] for production and by in-memory maps
/// in service tests.
pub trait SnapshotResolver {
    /// Fetch the current snapshot; `None` when the product no longer exists.
    fn snapshot(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<ProductSnapshot>, RepositoryError>> + Send;
}

impl<T: SnapshotResolver> SnapshotResolver for &T {
    fn snapshot(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<ProductSnapshot>, RepositoryError>> + Send {
        T::snapshot(self, product_id)
    }
}

/// Product catalog backed by the product, farm, and media tables.
pub struct ProductCatalog<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductCatalog<'a> {
    /// Create a new product catalog.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    unit_price: Decimal,
    discount_price: Option<Decimal>,
    unit: String,
    stock: i32,
    minimum_order: Option<i32>,
    image_url: Option<String>,
    farm_name: Option<String>,
}

impl From<ProductRow> for ProductSnapshot {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            unit_price: row.unit_price,
            discount_price: row.discount_price,
            unit: row.unit,
            stock: u32::try_from(row.stock).unwrap_or(0),
            minimum_order: row
                .minimum_order
                .and_then(|minimum| u32::try_from(minimum).ok()),
            image_url: row.image_url,
            farm_name: row.farm_name,
        }
    }
}

impl SnapshotResolver for ProductCatalog<'_> {
    async fn snapshot(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductSnapshot>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.unit_price, p.discount_price, p.unit, p.stock,
                   p.minimum_order, m.url AS image_url, f.name AS farm_name
            FROM products p
            LEFT JOIN farms f ON f.id = p.farm_id
            LEFT JOIN LATERAL (
                SELECT url
                FROM product_media
                WHERE product_id = p.id
                ORDER BY position ASC
                LIMIT 1
            ) m ON TRUE
            WHERE p.id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProductSnapshot::from))
    }
}
