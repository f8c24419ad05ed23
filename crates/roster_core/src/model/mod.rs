//! Entity model for members, teams and items.
//!
//! # Responsibility
//! - Define the records persisted by the repository layer.
//! - Enforce field-level invariants before any write reaches storage.
//!
//! # Invariants
//! - Identifiers are assigned once (by storage for members/teams, at
//!   construction for items) and never change afterwards.
//! - A member's team reference always points at a persisted team.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item;
pub mod member;
pub mod team;

pub type ModelResult<T> = Result<T, ModelError>;

/// Field-level validation failures for entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    BlankUsername,
    NegativeAge(i64),
    BlankTeamName,
    /// Team has no id yet, so it cannot be referenced.
    TransientTeam,
    NilItemId,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "member username must not be blank"),
            Self::NegativeAge(age) => write!(f, "member age must be >= 0, got {age}"),
            Self::BlankTeamName => write!(f, "team name must not be blank"),
            Self::TransientTeam => write!(f, "team must be saved before it can be referenced"),
            Self::NilItemId => write!(f, "item id must not be nil"),
        }
    }
}

impl Error for ModelError {}
