//! Cart route handlers.
//!
//! Every operation returns the full cart document; the client replaces
//! its local copy wholesale (the optimistic layer collapses speculative
//! state onto whatever comes back). Which backend serves the request is
//! decided here, once, from the session: a signed-in user gets the row
//! store, everyone else the session slot.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use farmgate_core::{Cart, LineId, ProductId};

use crate::db::{DbCartStore, ProductCatalog};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::CartService;
use crate::state::AppState;
use crate::stores::GuestCartStore;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub line_id: LineId,
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub line_id: LineId,
}

/// Get the current cart.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Cart>> {
    let catalog = ProductCatalog::new(state.pool());
    let cart = match user {
        Some(user) => {
            CartService::new(catalog, DbCartStore::new(state.pool(), user.id))
                .get()
                .await?
        }
        None => {
            CartService::new(catalog, GuestCartStore::new(session))
                .get()
                .await?
        }
    };

    Ok(Json(cart))
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<Cart>> {
    let quantity = request.quantity.unwrap_or(1);
    let catalog = ProductCatalog::new(state.pool());
    let cart = match user {
        Some(user) => {
            CartService::new(catalog, DbCartStore::new(state.pool(), user.id))
                .add(request.product_id, quantity)
                .await?
        }
        None => {
            CartService::new(catalog, GuestCartStore::new(session))
                .add(request.product_id, quantity)
                .await?
        }
    };

    Ok(Json(cart))
}

/// Set a line's quantity; zero or negative removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<Cart>> {
    let catalog = ProductCatalog::new(state.pool());
    let cart = match user {
        Some(user) => {
            CartService::new(catalog, DbCartStore::new(state.pool(), user.id))
                .update_quantity(&request.line_id, request.quantity)
                .await?
        }
        None => {
            CartService::new(catalog, GuestCartStore::new(session))
                .update_quantity(&request.line_id, request.quantity)
                .await?
        }
    };

    Ok(Json(cart))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<Cart>> {
    let catalog = ProductCatalog::new(state.pool());
    let cart = match user {
        Some(user) => {
            CartService::new(catalog, DbCartStore::new(state.pool(), user.id))
                .remove(&request.line_id)
                .await?
        }
        None => {
            CartService::new(catalog, GuestCartStore::new(session))
                .remove(&request.line_id)
                .await?
        }
    };

    Ok(Json(cart))
}
