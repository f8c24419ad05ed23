//! Item entity with caller-visible identity.
//!
//! Unlike members and teams, an item carries its id from construction.
//! Newness is therefore decided by the audit timestamp: an item that was
//! never saved has no `created_at`.

use super::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ItemId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    /// Unix epoch milliseconds, assigned by storage. Deserialized items are
    /// always new.
    #[serde(skip_deserializing)]
    created_at: Option<i64>,
    /// Unix epoch milliseconds, refreshed by storage on every write.
    #[serde(skip_deserializing)]
    last_modified_at: Option<i64>,
}

impl Item {
    /// Creates a new item with a generated id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: None,
            last_modified_at: None,
        }
    }

    /// Creates a new item with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: ItemId) -> ModelResult<Self> {
        if id.is_nil() {
            return Err(ModelError::NilItemId);
        }
        Ok(Self {
            id,
            created_at: None,
            last_modified_at: None,
        })
    }

    pub(crate) fn from_storage(id: ItemId, created_at: i64, last_modified_at: i64) -> Self {
        Self {
            id,
            created_at: Some(created_at),
            last_modified_at: Some(last_modified_at),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    pub fn last_modified_at(&self) -> Option<i64> {
        self.last_modified_at
    }

    /// Returns whether this item has never been saved.
    pub fn is_new(&self) -> bool {
        self.created_at.is_none()
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new()
    }
}
