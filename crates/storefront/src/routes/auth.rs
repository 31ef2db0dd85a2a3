//! Authentication route handlers.
//!
//! Login and register are the sign-in *transition*: right after the
//! credential check succeeds, the session ID is cycled, the user lands in
//! the session, and the guest cart/wishlist reconcilers run — once. The
//! response carries the merged aggregates so the client re-syncs in the
//! same round trip.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use farmgate_core::{Cart, Wishlist};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AuthService, merge};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful sign-in: the user plus the post-merge state
/// the client must replace its local copies with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: CurrentUser,
    pub cart: Cart,
    pub wishlist: Wishlist,
}

/// Establish the signed-in session and fold guest state into the account.
async fn complete_sign_in(
    state: &AppState,
    session: &Session,
    user: CurrentUser,
) -> Result<AuthResponse> {
    // New session identity across the privilege change.
    if let Err(e) = session.cycle_id().await {
        tracing::error!("failed to cycle session id: {e}");
    }

    set_current_user(session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    let (cart, wishlist) = merge::reconcile_sign_in(state.pool(), session, user.id).await?;

    Ok(AuthResponse {
        user,
        cart,
        wishlist,
    })
}

/// Register a new account and sign it in.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .register_with_password(&request.email, &request.password)
        .await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };
    Ok(Json(complete_sign_in(&state, &session, current).await?))
}

/// Sign in with email and password.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .login_with_password(&request.email, &request.password)
        .await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };
    Ok(Json(complete_sign_in(&state, &session, current).await?))
}

/// Sign out. The browser keeps its (now guest) session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
