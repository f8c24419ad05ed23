//! Explicit unit-of-work scope over one SQLite transaction.
//!
//! # Responsibility
//! - Group repository writes so they commit or roll back together.
//! - Hold the database write lock for pessimistic read paths.
//!
//! # Invariants
//! - The transaction is opened with `BEGIN IMMEDIATE`, so the write lock is
//!   held from `begin` until `commit`/`rollback`.
//! - Dropping an uncommitted unit of work rolls it back.

use super::DbResult;
use crate::repo::item_repo::SqliteItemRepository;
use crate::repo::member_repo::SqliteMemberRepository;
use crate::repo::team_repo::SqliteTeamRepository;
use crate::repo::RepoResult;
use log::{debug, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// One unit of work bound to a mutable connection borrow.
pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
    started_at: Instant,
}

impl<'conn> UnitOfWork<'conn> {
    /// Opens an IMMEDIATE transaction on `conn`.
    pub fn begin(conn: &'conn mut Connection) -> DbResult<Self> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=uow_begin module=db status=ok");
        Ok(Self {
            tx,
            started_at: Instant::now(),
        })
    }

    /// Connection view scoped to this unit of work.
    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    /// Member repository allowed to run locking reads.
    pub fn members(&self) -> RepoResult<SqliteMemberRepository<'_>> {
        SqliteMemberRepository::try_new_locked(&self.tx)
    }

    pub fn teams(&self) -> RepoResult<SqliteTeamRepository<'_>> {
        SqliteTeamRepository::try_new(&self.tx)
    }

    pub fn items(&self) -> RepoResult<SqliteItemRepository<'_>> {
        SqliteItemRepository::try_new(&self.tx)
    }

    /// Makes every change of this unit of work durable.
    pub fn commit(self) -> DbResult<()> {
        let elapsed = self.started_at.elapsed().as_millis();
        self.tx.commit()?;
        info!("event=uow_commit module=db status=ok duration_ms={elapsed}");
        Ok(())
    }

    /// Discards every change of this unit of work.
    pub fn rollback(self) -> DbResult<()> {
        let elapsed = self.started_at.elapsed().as_millis();
        self.tx.rollback()?;
        info!("event=uow_rollback module=db status=ok duration_ms={elapsed}");
        Ok(())
    }
}
