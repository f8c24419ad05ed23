//! Item repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A new item (`Item::is_new`) is always inserted; reusing an existing id
//!   fails with the storage's primary-key violation.
//! - Saving a non-new item upserts it and refreshes `last_modified_at`.

use super::{
    ensure_connection_ready, push_window, query_count, CrudRepository, RepoError, RepoResult,
    ITEM_TABLE,
};
use crate::model::item::{Item, ItemId};
use crate::query::{ItemField, Page, PageRequest, Sort};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    i.id AS id,
    i.created_at AS created_at,
    i.last_modified_at AS last_modified_at
FROM item i";

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[ITEM_TABLE])?;
        Ok(Self { conn })
    }

    fn select(
        &self,
        id: Option<ItemId>,
        sort: &Sort<ItemField>,
        window: Option<(u64, u64)>,
    ) -> RepoResult<Vec<Item>> {
        let mut sql = String::from(ITEM_SELECT_SQL);
        let mut binds: Vec<Value> = Vec::new();
        if let Some(id) = id {
            sql.push_str(" WHERE i.id = ?");
            binds.push(Value::Text(id.to_string()));
        }
        sql.push_str(&sort.order_by_clause());
        if let Some((limit, offset)) = window {
            push_window(&mut sql, &mut binds, limit, offset);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

impl CrudRepository for SqliteItemRepository<'_> {
    type Entity = Item;
    type Id = ItemId;
    type Field = ItemField;

    fn save(&self, item: &Item) -> RepoResult<Item> {
        let id_text = item.id().to_string();
        if item.is_new() {
            self.conn
                .execute("INSERT INTO item (id) VALUES (?1);", [id_text.as_str()])?;
        } else {
            self.conn.execute(
                "INSERT INTO item (id) VALUES (?1)
                 ON CONFLICT (id) DO UPDATE SET
                    last_modified_at = (strftime('%s', 'now') * 1000);",
                [id_text.as_str()],
            )?;
        }

        debug!(
            "event=item_save module=repo status=ok item_id={} new={}",
            id_text,
            item.is_new()
        );
        self.find_by_id(item.id())?
            .ok_or(RepoError::InconsistentState("saved item not found in read-back"))
    }

    fn find_by_id(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut items = self.select(Some(id), &Sort::unsorted(), None)?;
        Ok(items.pop())
    }

    fn exists_by_id(&self, id: ItemId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM item WHERE id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_all(&self) -> RepoResult<Vec<Item>> {
        self.find_all_sorted(&Sort::unsorted())
    }

    fn find_all_sorted(&self, sort: &Sort<ItemField>) -> RepoResult<Vec<Item>> {
        self.select(None, sort, None)
    }

    fn find_page(&self, request: &PageRequest<ItemField>) -> RepoResult<Page<Item>> {
        let content = self.select(
            None,
            request.sort(),
            Some((u64::from(request.size()), request.offset())),
        )?;
        let total = self.count()?;
        Ok(Page::new(content, request.page(), request.size(), total))
    }

    fn delete(&self, item: &Item) -> RepoResult<()> {
        self.delete_by_id(item.id())
    }

    fn delete_by_id(&self, id: ItemId) -> RepoResult<()> {
        let id_text = id.to_string();
        let changed = self
            .conn
            .execute("DELETE FROM item WHERE id = ?1;", [id_text.as_str()])?;
        debug!("event=item_delete module=repo status=ok item_id={id_text} changed={changed}");
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        query_count(self.conn, "SELECT COUNT(*) FROM item;", Vec::new())
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in item.id"))
    })?;
    Ok(Item::from_storage(
        id,
        row.get("created_at")?,
        row.get("last_modified_at")?,
    ))
}
