//! Database operations for storefront `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` / `user_passwords` - Site authentication
//! - `farms` - Seller profiles
//! - `products` / `product_media` - Catalog (source of truth for price and stock)
//! - `cart_lines` - One row per `(user, product)`, quantity only
//! - `wishlist_lines` - One row per `(user, product)`
//! - tower-sessions also manages its own session table
//!
//! Cart and wishlist rows deliberately store no price or stock; reads join
//! the product table so the catalog stays the single source of truth.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p farmgate-cli -- migrate
//! ```

pub mod cart_lines;
pub mod products;
pub mod users;
pub mod wishlist_lines;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart_lines::DbCartStore;
pub use products::{ProductCatalog, SnapshotResolver};
pub use users::UserRepository;
pub use wishlist_lines::DbWishlistStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
