//! Composable member specifications.
//!
//! A specification is a predicate tree rendered into a `WHERE` fragment over
//! `member m LEFT JOIN team t ON t.id = m.team_id`.

use crate::model::member::MemberId;
use crate::model::team::TeamId;
use rusqlite::types::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MemberSpec {
    /// Matches every member.
    #[default]
    All,
    /// `m.id = ?`
    IdEq(MemberId),
    /// Exact, case-sensitive username match.
    UsernameEq(String),
    /// Username in the list. Matches nothing when the list is empty.
    UsernameIn(Vec<String>),
    /// `m.age = ?`
    AgeEq(i64),
    /// `m.age > ?`
    AgeGreaterThan(i64),
    /// `m.age >= ?`
    AgeAtLeast(i64),
    /// `m.age < ?`
    AgeLessThan(i64),
    /// Member references the given team id.
    TeamIdEq(TeamId),
    /// Referenced team's name matches exactly; teamless members never match.
    TeamNameEq(String),
    /// Member references any team.
    HasTeam,
    /// Both sides match.
    And(Box<MemberSpec>, Box<MemberSpec>),
    /// Either side matches.
    Or(Box<MemberSpec>, Box<MemberSpec>),
    /// Inner specification does not match.
    Not(Box<MemberSpec>),
}

impl MemberSpec {
    pub fn all() -> Self {
        Self::All
    }

    pub fn id(id: MemberId) -> Self {
        Self::IdEq(id)
    }

    pub fn username(username: impl Into<String>) -> Self {
        Self::UsernameEq(username.into())
    }

    pub fn username_in<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::UsernameIn(usernames.into_iter().map(Into::into).collect())
    }

    pub fn age(age: i64) -> Self {
        Self::AgeEq(age)
    }

    pub fn age_greater_than(age: i64) -> Self {
        Self::AgeGreaterThan(age)
    }

    pub fn age_at_least(age: i64) -> Self {
        Self::AgeAtLeast(age)
    }

    pub fn age_less_than(age: i64) -> Self {
        Self::AgeLessThan(age)
    }

    pub fn team(team_id: TeamId) -> Self {
        Self::TeamIdEq(team_id)
    }

    pub fn team_name(name: impl Into<String>) -> Self {
        Self::TeamNameEq(name.into())
    }

    pub fn has_team() -> Self {
        Self::HasTeam
    }

    pub fn and(self, other: MemberSpec) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: MemberSpec) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Appends this predicate to `sql`, pushing one bind value per `?`.
    pub(crate) fn write_sql(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::All => sql.push_str("1 = 1"),
            Self::IdEq(id) => {
                sql.push_str("m.id = ?");
                binds.push(Value::Integer(*id));
            }
            Self::UsernameEq(username) => {
                sql.push_str("m.username = ?");
                binds.push(Value::Text(username.clone()));
            }
            Self::UsernameIn(usernames) => {
                if usernames.is_empty() {
                    sql.push_str("0 = 1");
                    return;
                }
                let placeholders = vec!["?"; usernames.len()].join(", ");
                sql.push_str(&format!("m.username IN ({placeholders})"));
                binds.extend(usernames.iter().cloned().map(Value::Text));
            }
            Self::AgeEq(age) => {
                sql.push_str("m.age = ?");
                binds.push(Value::Integer(*age));
            }
            Self::AgeGreaterThan(age) => {
                sql.push_str("m.age > ?");
                binds.push(Value::Integer(*age));
            }
            Self::AgeAtLeast(age) => {
                sql.push_str("m.age >= ?");
                binds.push(Value::Integer(*age));
            }
            Self::AgeLessThan(age) => {
                sql.push_str("m.age < ?");
                binds.push(Value::Integer(*age));
            }
            Self::TeamIdEq(team_id) => {
                sql.push_str("m.team_id = ?");
                binds.push(Value::Integer(*team_id));
            }
            Self::TeamNameEq(name) => {
                sql.push_str("t.name = ?");
                binds.push(Value::Text(name.clone()));
            }
            Self::HasTeam => sql.push_str("m.team_id IS NOT NULL"),
            Self::And(left, right) => write_binary(sql, binds, left, "AND", right),
            Self::Or(left, right) => write_binary(sql, binds, left, "OR", right),
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.write_sql(sql, binds);
                sql.push(')');
            }
        }
    }
}

fn write_binary(
    sql: &mut String,
    binds: &mut Vec<Value>,
    left: &MemberSpec,
    operator: &str,
    right: &MemberSpec,
) {
    sql.push('(');
    left.write_sql(sql, binds);
    sql.push_str(&format!(" {operator} "));
    right.write_sql(sql, binds);
    sql.push(')');
}

#[cfg(test)]
mod tests {
    use super::MemberSpec;
    use rusqlite::types::Value;

    fn render(spec: &MemberSpec) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        spec.write_sql(&mut sql, &mut binds);
        (sql, binds)
    }

    #[test]
    fn combinators_nest_with_parentheses() {
        let spec = MemberSpec::username("AAA")
            .and(MemberSpec::age_greater_than(15))
            .or(MemberSpec::team_name("teamA").negate());
        let (sql, binds) = render(&spec);
        assert_eq!(
            sql,
            "((m.username = ? AND m.age > ?) OR NOT (t.name = ?))"
        );
        assert_eq!(
            binds,
            vec![
                Value::Text("AAA".to_string()),
                Value::Integer(15),
                Value::Text("teamA".to_string()),
            ]
        );
    }

    #[test]
    fn empty_username_list_matches_nothing() {
        let (sql, binds) = render(&MemberSpec::username_in(Vec::<String>::new()));
        assert_eq!(sql, "0 = 1");
        assert!(binds.is_empty());
    }

    #[test]
    fn username_list_binds_each_value() {
        let (sql, binds) = render(&MemberSpec::username_in(["AAA", "BBB"]));
        assert_eq!(sql, "m.username IN (?, ?)");
        assert_eq!(binds.len(), 2);
    }
}
