//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, typed queries, paging, projections and bulk updates over
//!   the `member` table.
//! - Resolve team data through a single `LEFT JOIN`, never a second query.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before SQL mutations.
//! - `bulk_age_plus` does not touch member values already handed out;
//!   callers reload them with `refresh`.
//! - Locking reads only run on repositories obtained from a `UnitOfWork`.

use super::{
    ensure_connection_ready, push_window, query_count, CrudRepository, RepoError, RepoResult,
    MEMBER_TABLE, TEAM_TABLE,
};
use crate::model::member::{Member, MemberId};
use crate::projection::{MemberDto, MemberProjection, MemberWithTeam, UsernameOnly};
use crate::query::{
    Direction, MemberExample, MemberField, MemberSpec, Page, PageRequest, Slice, Sort,
};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction};

const MEMBER_FROM_SQL: &str = "FROM member m
LEFT JOIN team t ON t.id = m.team_id";

/// Repository interface for member operations beyond plain CRUD.
pub trait MemberRepository:
    CrudRepository<Entity = Member, Id = MemberId, Field = MemberField>
{
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
    /// Members whose username and age both match exactly.
    fn find_by_username_and_age(&self, username: &str, age: i64) -> RepoResult<Vec<Member>>;
    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i64,
    ) -> RepoResult<Vec<Member>>;
    fn find_by_names(&self, usernames: &[String]) -> RepoResult<Vec<Member>>;
    fn find_all_matching(&self, spec: &MemberSpec, sort: &Sort<MemberField>)
        -> RepoResult<Vec<Member>>;
    fn find_all_by_example(&self, example: &MemberExample) -> RepoResult<Vec<Member>>;
    fn count_matching(&self, spec: &MemberSpec) -> RepoResult<u64>;
    fn find_page_matching(
        &self,
        spec: &MemberSpec,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>>;
    fn find_slice_matching(
        &self,
        spec: &MemberSpec,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>>;
    fn find_page_by_age(
        &self,
        age: i64,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>>;
    fn find_slice_by_age(
        &self,
        age: i64,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>>;
    /// Offset/limit window over members of `age`, ordered by username descending.
    fn find_by_page(&self, age: i64, offset: u64, limit: u64) -> RepoResult<Vec<Member>>;
    /// Number of members of `age`; pairs with `find_by_page`.
    fn total_count(&self, age: i64) -> RepoResult<u64>;
    /// Increments the age of every member with `age >= min_age`.
    ///
    /// Returns the number of affected rows.
    fn bulk_age_plus(&self, min_age: i64) -> RepoResult<usize>;
    /// Reloads `member` from storage. Returns `false` when the row is gone.
    fn refresh(&self, member: &mut Member) -> RepoResult<bool>;
    fn find_projected<P: MemberProjection>(
        &self,
        spec: &MemberSpec,
        sort: &Sort<MemberField>,
    ) -> RepoResult<Vec<P>>;
    fn find_projections_by_username<P: MemberProjection>(
        &self,
        username: &str,
    ) -> RepoResult<Vec<P>>;
    fn find_username_list(&self) -> RepoResult<Vec<String>>;
    fn find_member_dtos(&self) -> RepoResult<Vec<MemberDto>>;
    /// Members with their teams resolved in the same statement.
    fn find_all_with_team(&self) -> RepoResult<Vec<MemberWithTeam>>;
    /// Reads members by username while the unit of work holds the write lock.
    fn find_lock_by_username(&self, username: &str) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
    /// Set only for repositories handed out by a `UnitOfWork`, whose
    /// transaction holds the write lock.
    holds_write_lock: bool,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates a repository from a migrated connection.
    ///
    /// Locking reads are rejected on repositories built this way, even over
    /// an open transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TEAM_TABLE, MEMBER_TABLE])?;
        Ok(Self {
            conn,
            holds_write_lock: false,
        })
    }

    /// Creates a repository over an IMMEDIATE transaction.
    pub(crate) fn try_new_locked(tx: &'conn Transaction<'_>) -> RepoResult<Self> {
        let mut repo = Self::try_new(tx)?;
        repo.holds_write_lock = true;
        Ok(repo)
    }
}

impl CrudRepository for SqliteMemberRepository<'_> {
    type Entity = Member;
    type Id = MemberId;
    type Field = MemberField;

    fn save(&self, member: &Member) -> RepoResult<Member> {
        member.validate()?;

        let id = match member.id() {
            None => {
                // Stepped to completion: a busy autocommit fails on the last step.
                self.conn.execute(
                    "INSERT INTO member (username, age, team_id)
                     VALUES (?1, ?2, ?3);",
                    params![member.username.as_str(), member.age, member.team_id()],
                )?;
                self.conn.last_insert_rowid()
            }
            Some(id) => {
                self.conn.execute(
                    "INSERT INTO member (id, username, age, team_id)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (id) DO UPDATE SET
                        username = excluded.username,
                        age = excluded.age,
                        team_id = excluded.team_id,
                        updated_at = (strftime('%s', 'now') * 1000);",
                    params![id, member.username.as_str(), member.age, member.team_id()],
                )?;
                id
            }
        };

        debug!("event=member_save module=repo status=ok member_id={id}");
        self.find_by_id(id)?
            .ok_or(RepoError::InconsistentState("saved member not found in read-back"))
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut members = self.find_all_matching(&MemberSpec::id(id), &Sort::unsorted())?;
        Ok(members.pop())
    }

    fn exists_by_id(&self, id: MemberId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM member WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_all(&self) -> RepoResult<Vec<Member>> {
        self.find_all_sorted(&Sort::unsorted())
    }

    fn find_all_sorted(&self, sort: &Sort<MemberField>) -> RepoResult<Vec<Member>> {
        self.find_all_matching(&MemberSpec::All, sort)
    }

    fn find_page(&self, request: &PageRequest<MemberField>) -> RepoResult<Page<Member>> {
        self.find_page_matching(&MemberSpec::All, request)
    }

    fn delete(&self, member: &Member) -> RepoResult<()> {
        match member.id() {
            Some(id) => self.delete_by_id(id),
            None => Ok(()),
        }
    }

    fn delete_by_id(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM member WHERE id = ?1;", [id])?;
        debug!("event=member_delete module=repo status=ok member_id={id} changed={changed}");
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        query_count(self.conn, "SELECT COUNT(*) FROM member;", Vec::new())
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.find_all_matching(&MemberSpec::username(username), &Sort::unsorted())
    }

    fn find_by_username_and_age(&self, username: &str, age: i64) -> RepoResult<Vec<Member>> {
        let spec = MemberSpec::username(username).and(MemberSpec::age(age));
        self.find_all_matching(&spec, &Sort::unsorted())
    }

    fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i64,
    ) -> RepoResult<Vec<Member>> {
        let spec = MemberSpec::username(username).and(MemberSpec::age_greater_than(age));
        self.find_all_matching(&spec, &Sort::unsorted())
    }

    fn find_by_names(&self, usernames: &[String]) -> RepoResult<Vec<Member>> {
        self.find_all_matching(
            &MemberSpec::username_in(usernames.iter().cloned()),
            &Sort::unsorted(),
        )
    }

    fn find_all_matching(
        &self,
        spec: &MemberSpec,
        sort: &Sort<MemberField>,
    ) -> RepoResult<Vec<Member>> {
        select_projected(self.conn, spec, sort, None)
    }

    fn find_all_by_example(&self, example: &MemberExample) -> RepoResult<Vec<Member>> {
        self.find_all_matching(&example.to_spec(), &Sort::unsorted())
    }

    fn count_matching(&self, spec: &MemberSpec) -> RepoResult<u64> {
        let mut sql = format!("SELECT COUNT(*) {MEMBER_FROM_SQL} WHERE ");
        let mut binds = Vec::new();
        spec.write_sql(&mut sql, &mut binds);
        query_count(self.conn, &sql, binds)
    }

    fn find_page_matching(
        &self,
        spec: &MemberSpec,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>> {
        let content = select_projected(
            self.conn,
            spec,
            request.sort(),
            Some((u64::from(request.size()), request.offset())),
        )?;
        let total = self.count_matching(spec)?;
        Ok(Page::new(content, request.page(), request.size(), total))
    }

    fn find_slice_matching(
        &self,
        spec: &MemberSpec,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>> {
        let size = request.size();
        // One extra row tells whether another slice follows.
        let mut content: Vec<Member> = select_projected(
            self.conn,
            spec,
            request.sort(),
            Some((u64::from(size) + 1, request.offset())),
        )?;
        let has_next = content.len() > size as usize;
        content.truncate(size as usize);
        Ok(Slice::new(content, request.page(), size, has_next))
    }

    fn find_page_by_age(
        &self,
        age: i64,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Page<Member>> {
        self.find_page_matching(&MemberSpec::age(age), request)
    }

    fn find_slice_by_age(
        &self,
        age: i64,
        request: &PageRequest<MemberField>,
    ) -> RepoResult<Slice<Member>> {
        self.find_slice_matching(&MemberSpec::age(age), request)
    }

    fn find_by_page(&self, age: i64, offset: u64, limit: u64) -> RepoResult<Vec<Member>> {
        select_projected(
            self.conn,
            &MemberSpec::age(age),
            &Sort::by(Direction::Desc, MemberField::Username),
            Some((limit, offset)),
        )
    }

    fn total_count(&self, age: i64) -> RepoResult<u64> {
        self.count_matching(&MemberSpec::age(age))
    }

    fn bulk_age_plus(&self, min_age: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE member
             SET
                age = age + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE age >= ?1;",
            [min_age],
        )?;
        info!(
            "event=bulk_update module=repo status=ok op=age_plus min_age={min_age} changed={changed}"
        );
        Ok(changed)
    }

    fn refresh(&self, member: &mut Member) -> RepoResult<bool> {
        let Some(id) = member.id() else {
            return Ok(false);
        };
        match self.find_by_id(id)? {
            Some(fresh) => {
                *member = fresh;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_projected<P: MemberProjection>(
        &self,
        spec: &MemberSpec,
        sort: &Sort<MemberField>,
    ) -> RepoResult<Vec<P>> {
        select_projected(self.conn, spec, sort, None)
    }

    fn find_projections_by_username<P: MemberProjection>(
        &self,
        username: &str,
    ) -> RepoResult<Vec<P>> {
        self.find_projected(&MemberSpec::username(username), &Sort::unsorted())
    }

    fn find_username_list(&self) -> RepoResult<Vec<String>> {
        let rows: Vec<UsernameOnly> = self.find_projected(&MemberSpec::All, &Sort::unsorted())?;
        Ok(rows.into_iter().map(|row| row.username).collect())
    }

    fn find_member_dtos(&self) -> RepoResult<Vec<MemberDto>> {
        self.find_projected(&MemberSpec::All, &Sort::unsorted())
    }

    fn find_all_with_team(&self) -> RepoResult<Vec<MemberWithTeam>> {
        self.find_projected(&MemberSpec::All, &Sort::unsorted())
    }

    fn find_lock_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        if !self.holds_write_lock || self.conn.is_autocommit() {
            return Err(RepoError::LockRequiresTransaction);
        }
        debug!("event=lock_query module=repo status=start mode=immediate");
        self.find_by_username(username)
    }
}

/// Runs one member query shaped as `P`.
///
/// `window` is `(limit, offset)`.
pub(crate) fn select_projected<P: MemberProjection>(
    conn: &Connection,
    spec: &MemberSpec,
    sort: &Sort<MemberField>,
    window: Option<(u64, u64)>,
) -> RepoResult<Vec<P>> {
    let mut sql = format!("SELECT {} {MEMBER_FROM_SQL} WHERE ", P::COLUMNS);
    let mut binds: Vec<Value> = Vec::new();
    spec.write_sql(&mut sql, &mut binds);
    sql.push_str(&sort.order_by_clause());
    if let Some((limit, offset)) = window {
        push_window(&mut sql, &mut binds, limit, offset);
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut shaped = Vec::new();
    while let Some(row) = rows.next()? {
        shaped.push(P::from_row(row)?);
    }
    Ok(shaped)
}
