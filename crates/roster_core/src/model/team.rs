//! Team entity.
//!
//! Members reference teams; a team never owns its members' lifecycle.
//! Use `TeamRepository::find_members` to load the back-reference.

use super::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Storage-assigned team identifier.
pub type TeamId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Storage-assigned; never read from serialized input.
    #[serde(skip_deserializing)]
    id: Option<TeamId>,
    pub name: String,
    /// Unix epoch milliseconds, assigned by storage.
    #[serde(skip_deserializing)]
    created_at: Option<i64>,
    /// Unix epoch milliseconds, refreshed by storage on every write.
    #[serde(skip_deserializing)]
    updated_at: Option<i64>,
}

impl Team {
    /// Creates a transient team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn from_storage(id: TeamId, name: String, created_at: i64, updated_at: i64) -> Self {
        Self {
            id: Some(id),
            name,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }

    pub fn id(&self) -> Option<TeamId> {
        self.id
    }

    pub fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::BlankTeamName);
        }
        Ok(())
    }
}
