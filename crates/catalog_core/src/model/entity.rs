//! Entity metadata and validation contracts.
//!
//! # Responsibility
//! - Define identity and timestamp bookkeeping shared by all entities.
//! - Define the validation contract enforced before persistence.
//!
//! # Invariants
//! - `id == UNASSIGNED_ID` means the entity has not been stored yet.
//! - `id` never changes after the storage layer assigns it.
//! - Timestamps are Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage-generated integer identity.
pub type EntityId = i64;

/// Identity value of an entity that has not been persisted.
pub const UNASSIGNED_ID: EntityId = 0;

/// Identity and timestamp metadata carried by every entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Assigned by storage on insert unless supplied explicitly.
    #[serde(default)]
    pub id: EntityId,
    /// Epoch milliseconds of the insert.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds of the latest successful write.
    #[serde(default)]
    pub last_modified_at: i64,
}

impl EntityMeta {
    /// Metadata for an entity that will be created with the given id.
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Returns whether storage has assigned an identity yet.
    pub fn is_assigned(&self) -> bool {
        self.id != UNASSIGNED_ID
    }
}

/// Field-level validation failure raised before any storage interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing, empty, or whitespace-only.
    Required { field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { field } => write!(f, "The {field} field is required."),
        }
    }
}

impl Error for ValidationError {}

/// Contract shared by every persisted record.
pub trait Entity {
    /// Identity and timestamps of this entity.
    fn meta(&self) -> &EntityMeta;

    /// Mutable access used by storage to stamp identity and timestamps.
    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Checks field rules. Must be called before any write.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Shortcut for `self.meta().id`.
    fn id(&self) -> EntityId {
        self.meta().id
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, EntityMeta, ValidationError, UNASSIGNED_ID};

    #[test]
    fn default_meta_is_unassigned() {
        let meta = EntityMeta::default();
        assert_eq!(meta.id, UNASSIGNED_ID);
        assert!(!meta.is_assigned());
        assert!(EntityMeta::with_id(7).is_assigned());
    }

    #[test]
    fn required_message_names_field() {
        let err = ValidationError::Required { field: "Name" };
        assert_eq!(err.to_string(), "The Name field is required.");
    }

    #[test]
    fn clock_is_after_2024() {
        assert!(now_epoch_ms() > 1_704_067_200_000);
    }
}
