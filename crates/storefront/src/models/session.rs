//! Session-related types.
//!
//! Types stored in the session for authentication state, plus the fixed
//! keys for the guest cart and wishlist documents.

use serde::{Deserialize, Serialize};

use farmgate_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous cart document.
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the anonymous wishlist document.
    pub const GUEST_WISHLIST: &str = "guest_wishlist";
}
