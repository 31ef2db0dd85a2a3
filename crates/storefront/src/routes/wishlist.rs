//! Wishlist route handlers.
//!
//! Same backend selection as the cart routes; adds are idempotent so the
//! client can fire them without checking membership first.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use farmgate_core::{ProductId, Wishlist};

use crate::db::{DbWishlistStore, ProductCatalog};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::WishlistService;
use crate::state::AppState;
use crate::stores::GuestWishlistStore;

/// Wishlist mutation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// Get the current wishlist.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Wishlist>> {
    let catalog = ProductCatalog::new(state.pool());
    let wishlist = match user {
        Some(user) => {
            WishlistService::new(catalog, DbWishlistStore::new(state.pool(), user.id))
                .get()
                .await?
        }
        None => {
            WishlistService::new(catalog, GuestWishlistStore::new(session))
                .get()
                .await?
        }
    };

    Ok(Json(wishlist))
}

/// Add a product to the wishlist (no-op when already present).
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<WishlistRequest>,
) -> Result<Json<Wishlist>> {
    let catalog = ProductCatalog::new(state.pool());
    let wishlist = match user {
        Some(user) => {
            WishlistService::new(catalog, DbWishlistStore::new(state.pool(), user.id))
                .add(request.product_id)
                .await?
        }
        None => {
            WishlistService::new(catalog, GuestWishlistStore::new(session))
                .add(request.product_id)
                .await?
        }
    };

    Ok(Json(wishlist))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<WishlistRequest>,
) -> Result<Json<Wishlist>> {
    let catalog = ProductCatalog::new(state.pool());
    let wishlist = match user {
        Some(user) => {
            WishlistService::new(catalog, DbWishlistStore::new(state.pool(), user.id))
                .remove(request.product_id)
                .await?
        }
        None => {
            WishlistService::new(catalog, GuestWishlistStore::new(session))
                .remove(request.product_id)
                .await?
        }
    };

    Ok(Json(wishlist))
}
