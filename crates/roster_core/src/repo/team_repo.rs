//! Team repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a team that members still reference is rejected by the
//!   foreign key; members are never removed along with their team.

use super::member_repo::select_projected;
use super::{
    ensure_connection_ready, push_window, query_count, CrudRepository, RepoError, RepoResult,
    MEMBER_TABLE, TEAM_TABLE,
};
use crate::model::member::Member;
use crate::model::team::{Team, TeamId};
use crate::query::{MemberSpec, Page, PageRequest, Sort, TeamField};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TEAM_SELECT_SQL: &str = "SELECT
    t.id AS team_id,
    t.name AS name,
    t.created_at AS created_at,
    t.updated_at AS updated_at
FROM team t";

/// Repository interface for team operations beyond plain CRUD.
pub trait TeamRepository: CrudRepository<Entity = Team, Id = TeamId, Field = TeamField> {
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Team>>;
    /// Loads the members referencing `team`, ordered by member id.
    ///
    /// A transient team has no members.
    fn find_members(&self, team: &Team) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TEAM_TABLE, MEMBER_TABLE])?;
        Ok(Self { conn })
    }

    fn select(
        &self,
        filter: Option<(&str, Value)>,
        sort: &Sort<TeamField>,
        window: Option<(u64, u64)>,
    ) -> RepoResult<Vec<Team>> {
        let mut sql = String::from(TEAM_SELECT_SQL);
        let mut binds: Vec<Value> = Vec::new();
        if let Some((predicate, value)) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
            binds.push(value);
        }
        sql.push_str(&sort.order_by_clause());
        if let Some((limit, offset)) = window {
            push_window(&mut sql, &mut binds, limit, offset);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        Ok(teams)
    }
}

impl CrudRepository for SqliteTeamRepository<'_> {
    type Entity = Team;
    type Id = TeamId;
    type Field = TeamField;

    fn save(&self, team: &Team) -> RepoResult<Team> {
        team.validate()?;

        let id = match team.id() {
            None => {
                self.conn
                    .execute("INSERT INTO team (name) VALUES (?1);", [team.name.as_str()])?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                self.conn.execute(
                    "INSERT INTO team (id, name)
                     VALUES (?1, ?2)
                     ON CONFLICT (id) DO UPDATE SET
                        name = excluded.name,
                        updated_at = (strftime('%s', 'now') * 1000);",
                    params![id, team.name.as_str()],
                )?;
                id
            }
        };

        debug!("event=team_save module=repo status=ok team_id={id}");
        self.find_by_id(id)?
            .ok_or(RepoError::InconsistentState("saved team not found in read-back"))
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut teams = self.select(
            Some(("t.id = ?", Value::Integer(id))),
            &Sort::unsorted(),
            None,
        )?;
        Ok(teams.pop())
    }

    fn exists_by_id(&self, id: TeamId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM team WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_all(&self) -> RepoResult<Vec<Team>> {
        self.find_all_sorted(&Sort::unsorted())
    }

    fn find_all_sorted(&self, sort: &Sort<TeamField>) -> RepoResult<Vec<Team>> {
        self.select(None, sort, None)
    }

    fn find_page(&self, request: &PageRequest<TeamField>) -> RepoResult<Page<Team>> {
        let content = self.select(
            None,
            request.sort(),
            Some((u64::from(request.size()), request.offset())),
        )?;
        let total = self.count()?;
        Ok(Page::new(content, request.page(), request.size(), total))
    }

    fn delete(&self, team: &Team) -> RepoResult<()> {
        match team.id() {
            Some(id) => self.delete_by_id(id),
            None => Ok(()),
        }
    }

    fn delete_by_id(&self, id: TeamId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM team WHERE id = ?1;", [id])?;
        debug!("event=team_delete module=repo status=ok team_id={id} changed={changed}");
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        query_count(self.conn, "SELECT COUNT(*) FROM team;", Vec::new())
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Team>> {
        self.select(
            Some(("t.name = ?", Value::Text(name.to_string()))),
            &Sort::unsorted(),
            None,
        )
    }

    fn find_members(&self, team: &Team) -> RepoResult<Vec<Member>> {
        let Some(team_id) = team.id() else {
            return Ok(Vec::new());
        };
        select_projected(self.conn, &MemberSpec::team(team_id), &Sort::unsorted(), None)
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let team = Team::from_storage(
        row.get("team_id")?,
        row.get("name")?,
        row.get("created_at")?,
        row.get("updated_at")?,
    );
    team.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "team {} violates model invariants: {err}",
            team.id().unwrap_or_default()
        ))
    })?;
    Ok(team)
}
