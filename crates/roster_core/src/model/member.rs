//! Member entity.
//!
//! # Invariants
//! - `id` is `None` until the first save and immutable afterwards.
//! - `team_id`, when set, was taken from a persisted `Team`.

use super::team::{Team, TeamId};
use super::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Storage-assigned member identifier.
pub type MemberId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Storage-assigned; never read from serialized input.
    #[serde(skip_deserializing)]
    id: Option<MemberId>,
    pub username: String,
    pub age: i64,
    /// Referenced team; checked by the store's foreign key on save.
    team_id: Option<TeamId>,
    /// Unix epoch milliseconds, assigned by storage.
    #[serde(skip_deserializing)]
    created_at: Option<i64>,
    /// Unix epoch milliseconds, refreshed by storage on every write.
    #[serde(skip_deserializing)]
    updated_at: Option<i64>,
}

impl Member {
    /// Creates a transient member with age 0 and no team.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_age(username, 0)
    }

    pub fn with_age(username: impl Into<String>, age: i64) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Creates a transient member already assigned to `team`.
    pub fn with_team(username: impl Into<String>, age: i64, team: &Team) -> ModelResult<Self> {
        let mut member = Self::with_age(username, age);
        member.change_team(team)?;
        Ok(member)
    }

    pub(crate) fn from_storage(
        id: MemberId,
        username: String,
        age: i64,
        team_id: Option<TeamId>,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        Self {
            id: Some(id),
            username,
            age,
            team_id,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }

    pub fn id(&self) -> Option<MemberId> {
        self.id
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    pub fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Returns whether this member has never been saved.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Moves this member into `team`.
    ///
    /// # Errors
    /// - `ModelError::TransientTeam` when `team` has not been saved.
    pub fn change_team(&mut self, team: &Team) -> ModelResult<()> {
        let team_id = team.id().ok_or(ModelError::TransientTeam)?;
        self.team_id = Some(team_id);
        Ok(())
    }

    pub fn leave_team(&mut self) {
        self.team_id = None;
    }

    /// Checks field invariants required before persistence.
    pub fn validate(&self) -> ModelResult<()> {
        if self.username.trim().is_empty() {
            return Err(ModelError::BlankUsername);
        }
        if self.age < 0 {
            return Err(ModelError::NegativeAge(self.age));
        }
        Ok(())
    }
}
