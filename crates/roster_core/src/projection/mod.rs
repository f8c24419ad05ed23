//! Row shaping for member queries.
//!
//! # Responsibility
//! - Map one result row to either the full entity or a narrowed view.
//! - Declare, per shape, exactly which columns a query must select.
//!
//! # Invariants
//! - Every select list is written against
//!   `member m LEFT JOIN team t ON t.id = m.team_id`.
//! - Building a projection never issues another query; related data is
//!   either in the row or absent.

use crate::model::member::{Member, MemberId};
use crate::model::team::{Team, TeamId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A shape that a member query can return.
pub trait MemberProjection: Sized {
    /// Select list for this shape.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

const MEMBER_COLUMNS: &str = "m.id AS member_id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id,
    m.created_at AS created_at,
    m.updated_at AS updated_at";

impl MemberProjection for Member {
    const COLUMNS: &'static str = MEMBER_COLUMNS;

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let member = Member::from_storage(
            row.get("member_id")?,
            row.get("username")?,
            row.get("age")?,
            row.get("team_id")?,
            row.get("created_at")?,
            row.get("updated_at")?,
        );
        member.validate().map_err(|err| {
            RepoError::InvalidData(format!(
                "member {} violates model invariants: {err}",
                member.id().unwrap_or_default()
            ))
        })?;
        Ok(member)
    }
}

/// Username-only view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameOnly {
    pub username: String,
}

impl MemberProjection for UsernameOnly {
    const COLUMNS: &'static str = "m.username AS username";

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            username: row.get("username")?,
        })
    }
}

/// Flat member view with the referenced team's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: MemberId,
    pub username: String,
    /// `None` when the member has no team.
    pub team_name: Option<String>,
}

impl MemberDto {
    pub fn new(id: MemberId, username: impl Into<String>, team_name: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            team_name,
        }
    }

    /// Builds a DTO from an already loaded member and its team.
    ///
    /// Returns `None` for a member that was never saved.
    pub fn from_member(member: &Member, team: Option<&Team>) -> Option<Self> {
        let id = member.id()?;
        Some(Self {
            id,
            username: member.username.clone(),
            team_name: team.map(|team| team.name.clone()),
        })
    }
}

impl MemberProjection for MemberDto {
    const COLUMNS: &'static str = "m.id AS member_id,
    m.username AS username,
    t.name AS team_name";

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("member_id")?,
            username: row.get("username")?,
            team_name: row.get("team_name")?,
        })
    }
}

/// Member with its team resolved in the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberWithTeam {
    pub member: Member,
    pub team: Option<Team>,
}

impl MemberProjection for MemberWithTeam {
    const COLUMNS: &'static str = "m.id AS member_id,
    m.username AS username,
    m.age AS age,
    m.team_id AS team_id,
    m.created_at AS created_at,
    m.updated_at AS updated_at,
    t.id AS joined_team_id,
    t.name AS team_name,
    t.created_at AS team_created_at,
    t.updated_at AS team_updated_at";

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let member = Member::from_row(row)?;
        let team = match row.get::<_, Option<TeamId>>("joined_team_id")? {
            Some(team_id) => Some(Team::from_storage(
                team_id,
                row.get("team_name")?,
                row.get("team_created_at")?,
                row.get("team_updated_at")?,
            )),
            None => None,
        };
        Ok(Self { member, team })
    }
}
