//! Shared scalar types.

pub mod email;
pub mod id;
pub mod line_id;

pub use email::{Email, EmailError};
pub use id::{CartLineId, FarmId, ProductId, UserId};
pub use line_id::LineId;
