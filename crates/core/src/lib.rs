//! Farmgate shared types and cart logic.
//!
//! This crate holds the domain model for the cart and wishlist engine:
//! the aggregates themselves, the pure arithmetic every backend applies,
//! and the optimistic state machine the client renders from. It performs
//! no I/O — persistence lives in the storefront crate behind the store
//! capability traits.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod optimistic;
pub mod product;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, CartItem};
pub use optimistic::{CartAction, Optimistic, Phase, Speculate, WishlistAction};
pub use product::ProductSnapshot;
pub use types::{CartLineId, Email, EmailError, FarmId, LineId, ProductId, UserId};
pub use wishlist::{Wishlist, WishlistItem};
