//! Cart line identity across the guest/account boundary.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CartLineId;

/// Identity of a single cart line.
///
/// Guest lines are keyed by a locally generated UUID; account lines carry
/// the database row ID. The two kinds never convert into each other: the
/// sign-in merge re-keys every guest line by product, so a `Local` ID is
/// meaningless once the cart lives in the backing store.
///
/// Serializes untagged — row IDs as integers, local IDs as UUID strings —
/// which matches both the persisted guest document and the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineId {
    /// Store-assigned row ID for an authenticated user's line.
    Stored(CartLineId),
    /// Locally generated ID for a guest line.
    Local(Uuid),
}

impl LineId {
    /// Generate a fresh local (guest) line ID.
    #[must_use]
    pub fn local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Whether this is a locally generated guest ID.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl From<CartLineId> for LineId {
    fn from(id: CartLineId) -> Self {
        Self::Stored(id)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored(id) => write!(f, "{id}"),
            Self::Local(uuid) => write!(f, "{uuid}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_ids_serialize_as_integers() {
        let id = LineId::from(CartLineId::new(42));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
    }

    #[test]
    fn test_local_ids_serialize_as_uuid_strings() {
        let uuid = Uuid::new_v4();
        let id = LineId::Local(uuid);
        assert_eq!(
            serde_json::to_string(&id).expect("serialize"),
            format!("\"{uuid}\"")
        );
    }

    #[test]
    fn test_untagged_deserialization_distinguishes_kinds() {
        let stored: LineId = serde_json::from_str("7").expect("stored");
        assert!(!stored.is_local());

        let uuid = Uuid::new_v4();
        let local: LineId = serde_json::from_str(&format!("\"{uuid}\"")).expect("local");
        assert_eq!(local, LineId::Local(uuid));
    }
}
