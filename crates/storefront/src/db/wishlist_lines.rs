//! Account wishlist persistence.
//!
//! Membership rows only; display data comes from the product tables at
//! read time, exactly like the cart.

use rust_decimal::Decimal;
use sqlx::PgPool;

use farmgate_core::{ProductId, UserId, Wishlist, WishlistItem};

use super::RepositoryError;
use crate::stores::WishlistStore;

/// Wishlist store backed by the `wishlist_lines` table.
pub struct DbWishlistStore<'a> {
    pool: &'a PgPool,
    user_id: UserId,
}

impl<'a> DbWishlistStore<'a> {
    /// Create a store for one user's wishlist.
    #[must_use]
    pub const fn new(pool: &'a PgPool, user_id: UserId) -> Self {
        Self { pool, user_id }
    }
}

#[derive(sqlx::FromRow)]
struct WishlistLineRow {
    product_id: ProductId,
    name: String,
    unit_price: Decimal,
    discount_price: Option<Decimal>,
    stock: i32,
    image_url: Option<String>,
    farm_name: Option<String>,
}

impl From<WishlistLineRow> for WishlistItem {
    fn from(row: WishlistLineRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.discount_price.unwrap_or(row.unit_price),
            stock: u32::try_from(row.stock).unwrap_or(0),
            image_url: row.image_url,
            farm_name: row.farm_name,
        }
    }
}

impl WishlistStore for DbWishlistStore<'_> {
    async fn read(&self) -> Result<Wishlist, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistLineRow>(
            r"
            SELECT p.id AS product_id, p.name, p.unit_price, p.discount_price,
                   p.stock, m.url AS image_url, f.name AS farm_name
            FROM wishlist_lines wl
            JOIN products p ON p.id = wl.product_id
            LEFT JOIN farms f ON f.id = p.farm_id
            LEFT JOIN LATERAL (
                SELECT url
                FROM product_media
                WHERE product_id = p.id
                ORDER BY position ASC
                LIMIT 1
            ) m ON TRUE
            WHERE wl.user_id = $1
            ORDER BY wl.created_at ASC
            ",
        )
        .bind(self.user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Wishlist {
            items: rows.into_iter().map(WishlistItem::from).collect(),
        })
    }

    async fn upsert(&self, item: &WishlistItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO wishlist_lines (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(self.user_id)
        .bind(item.product_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist_lines WHERE user_id = $1 AND product_id = $2")
            .bind(self.user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist_lines WHERE user_id = $1")
            .bind(self.user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
