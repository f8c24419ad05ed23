//! Query-by-example for members.
//!
//! A probe member (plus an optional probe team) is turned into an equality
//! specification over every field the probe sets, minus ignored fields.

use super::sort::MemberField;
use super::spec::MemberSpec;
use crate::model::member::{Member, MemberId};
use crate::model::team::Team;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberExample {
    id: Option<MemberId>,
    username: Option<String>,
    age: Option<i64>,
    team_name: Option<String>,
}

impl MemberExample {
    /// Builds an example from `probe` and the probe's team, if any.
    ///
    /// Age is always part of the probe (it defaults to 0), so callers that do
    /// not care about it must use `ignoring(MemberField::Age)`.
    pub fn of(probe: &Member, team: Option<&Team>) -> Self {
        Self {
            id: probe.id(),
            username: Some(probe.username.clone()),
            age: Some(probe.age),
            team_name: team.map(|team| team.name.clone()),
        }
    }

    /// Excludes `field` from matching.
    pub fn ignoring(mut self, field: MemberField) -> Self {
        match field {
            MemberField::Id => self.id = None,
            MemberField::Username => self.username = None,
            MemberField::Age => self.age = None,
            MemberField::TeamName => self.team_name = None,
        }
        self
    }

    pub fn to_spec(&self) -> MemberSpec {
        let mut parts = Vec::new();
        if let Some(id) = self.id {
            parts.push(MemberSpec::id(id));
        }
        if let Some(username) = self.username.as_ref() {
            parts.push(MemberSpec::username(username.clone()));
        }
        if let Some(age) = self.age {
            parts.push(MemberSpec::age(age));
        }
        if let Some(team_name) = self.team_name.as_ref() {
            parts.push(MemberSpec::team_name(team_name.clone()));
        }
        parts
            .into_iter()
            .reduce(MemberSpec::and)
            .unwrap_or(MemberSpec::All)
    }
}
