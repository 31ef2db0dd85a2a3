//! Business-logic services.
//!
//! Services own the rules (accumulation, stock checks, merge policy) and
//! are generic over the store capabilities in `crate::stores`, so the same
//! code path serves guests and signed-in users. Handlers pick the backend;
//! services never look at ambient session state themselves.

pub mod auth;
pub mod cart;
pub mod merge;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthService;
pub use cart::{CartError, CartService};
pub use merge::{MergeOutcome, MergeReport};
pub use wishlist::{WishlistError, WishlistService};
