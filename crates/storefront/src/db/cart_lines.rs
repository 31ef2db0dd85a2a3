//! Account cart persistence.
//!
//! One row per `(user, product)`, holding only the quantity. Price, stock,
//! and display fields are joined in from the product tables on every read,
//! so a read always reflects the catalog as it is now.
//!
//! Rows are shared across all of a user's devices with no locking or
//! versioning: concurrent writers overwrite at the row level, and each
//! client converges to whatever won on its next read.

use rust_decimal::Decimal;
use sqlx::PgPool;

use farmgate_core::{Cart, CartItem, CartLineId, LineId, ProductId, UserId};

use super::RepositoryError;
use crate::stores::CartStore;

/// Cart store backed by the `cart_lines` table.
pub struct DbCartStore<'a> {
    pool: &'a PgPool,
    user_id: UserId,
}

impl<'a> DbCartStore<'a> {
    /// Create a store for one user's cart.
    #[must_use]
    pub const fn new(pool: &'a PgPool, user_id: UserId) -> Self {
        Self { pool, user_id }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    line_id: CartLineId,
    quantity: i32,
    product_id: ProductId,
    name: String,
    unit_price: Decimal,
    discount_price: Option<Decimal>,
    unit: String,
    minimum_order: Option<i32>,
    image_url: Option<String>,
}

impl From<CartLineRow> for CartItem {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: LineId::Stored(row.line_id),
            product_id: row.product_id,
            name: row.name,
            unit_price: row.unit_price,
            discount_price: row.discount_price,
            quantity: u32::try_from(row.quantity).unwrap_or(1),
            unit: row.unit,
            minimum_order: row
                .minimum_order
                .and_then(|minimum| u32::try_from(minimum).ok()),
            image_url: row.image_url,
        }
    }
}

impl CartStore for DbCartStore<'_> {
    async fn read(&self) -> Result<Cart, RepositoryError> {
        // INNER JOIN: a line whose product was deleted drops out of the
        // result rather than surfacing as an error.
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT cl.id AS line_id, cl.quantity,
                   p.id AS product_id, p.name, p.unit_price, p.discount_price,
                   p.unit, p.minimum_order, m.url AS image_url
            FROM cart_lines cl
            JOIN products p ON p.id = cl.product_id
            LEFT JOIN LATERAL (
                SELECT url
                FROM product_media
                WHERE product_id = p.id
                ORDER BY position ASC
                LIMIT 1
            ) m ON TRUE
            WHERE cl.user_id = $1
            ORDER BY cl.created_at ASC
            ",
        )
        .bind(self.user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Cart::from_items(rows.into_iter().map(CartItem::from).collect()))
    }

    async fn upsert(&self, item: &CartItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_lines (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
            ",
        )
        .bind(self.user_id)
        .bind(item.product_id)
        .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, line_id: &LineId) -> Result<(), RepositoryError> {
        match line_id {
            LineId::Stored(id) => {
                sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND user_id = $2")
                    .bind(*id)
                    .bind(self.user_id)
                    .execute(self.pool)
                    .await?;
            }
            LineId::Local(_) => {
                // A guest line ID cannot name a row here; stale client state.
                tracing::debug!(line_id = %line_id, "ignoring local line id on account cart");
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
            .bind(self.user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
