use roster_core::db::open_db_in_memory;
use roster_core::{CrudRepository, Item, RepoError, SqliteItemRepository};
use uuid::Uuid;

#[test]
fn new_item_is_inserted_with_audit_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = Item::new();
    assert!(item.is_new());

    let saved = repo.save(&item).unwrap();
    assert_eq!(saved.id(), item.id());
    assert!(!saved.is_new());
    assert!(saved.created_at().is_some());
    assert!(saved.last_modified_at().is_some());
    assert_eq!(repo.find_by_id(item.id()).unwrap(), Some(saved));
}

#[test]
fn caller_supplied_id_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let id = Uuid::parse_str("6f1c4e2a-93d1-4a57-8f62-0c3a1d9b7e11").unwrap();
    let saved = repo.save(&Item::with_id(id).unwrap()).unwrap();

    assert_eq!(saved.id(), id);
    assert!(repo.exists_by_id(id).unwrap());
}

#[test]
fn inserting_new_item_with_existing_id_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let id = Uuid::new_v4();
    repo.save(&Item::with_id(id).unwrap()).unwrap();

    let err = repo.save(&Item::with_id(id).unwrap()).unwrap_err();
    assert!(
        matches!(&err, RepoError::Db(db) if db.is_constraint_violation()),
        "unexpected error: {err}"
    );
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn saving_persisted_item_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Item::new()).unwrap();
    let resaved = repo.save(&saved).unwrap();

    assert_eq!(resaved.id(), saved.id());
    assert_eq!(resaved.created_at(), saved.created_at());
    assert!(resaved.last_modified_at() >= saved.last_modified_at());
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn delete_item_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let first = repo.save(&Item::new()).unwrap();
    let second = repo.save(&Item::new()).unwrap();
    assert_eq!(repo.find_all().unwrap().len(), 2);

    repo.delete(&first).unwrap();
    repo.delete(&first).unwrap();
    repo.delete_by_id(second.id()).unwrap();

    assert_eq!(repo.count().unwrap(), 0);
    assert_eq!(repo.find_by_id(first.id()).unwrap(), None);
}

#[test]
fn deserialized_item_is_new_and_keeps_its_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let saved = repo.save(&Item::new()).unwrap();

    let copy: Item = serde_json::from_value(serde_json::to_value(&saved).unwrap()).unwrap();
    assert_eq!(copy.id(), saved.id());
    assert!(copy.is_new());

    let err = repo.save(&copy).unwrap_err();
    assert!(
        matches!(&err, RepoError::Db(db) if db.is_constraint_violation()),
        "unexpected error: {err}"
    );
}
