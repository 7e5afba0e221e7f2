use eyewear_core::db::migrations::latest_version;
use eyewear_core::db::open_db_in_memory;
use eyewear_core::{DurableMap, MapBounds, MapRegion, StorageError};
use rusqlite::Connection;

const BOUNDS: MapBounds = MapBounds::new(44, 64);

fn map(conn: &Connection, region: MapRegion) -> DurableMap<'_, String> {
    DurableMap::try_new(conn, region, BOUNDS).unwrap()
}

#[test]
fn insert_get_and_replace() {
    let conn = open_db_in_memory().unwrap();
    let stores = map(&conn, MapRegion::STORES);

    assert_eq!(stores.get("a").unwrap(), None);
    stores.insert("a", &"first".to_string()).unwrap();
    assert_eq!(stores.get("a").unwrap().as_deref(), Some("first"));

    stores.insert("a", &"second".to_string()).unwrap();
    assert_eq!(stores.get("a").unwrap().as_deref(), Some("second"));
    assert_eq!(stores.len().unwrap(), 1);
}

#[test]
fn remove_returns_previous_value_once() {
    let conn = open_db_in_memory().unwrap();
    let stores = map(&conn, MapRegion::STORES);
    stores.insert("a", &"value".to_string()).unwrap();

    assert_eq!(stores.remove("a").unwrap().as_deref(), Some("value"));
    assert_eq!(stores.remove("a").unwrap(), None);
    assert!(!stores.contains_key("a").unwrap());
    assert!(stores.is_empty().unwrap());
}

#[test]
fn values_follow_key_order_not_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let stores = map(&conn, MapRegion::STORES);
    for key in ["charlie", "alpha", "bravo"] {
        stores.insert(key, &key.to_uppercase()).unwrap();
    }

    assert_eq!(stores.values().unwrap(), vec!["ALPHA", "BRAVO", "CHARLIE"]);
}

#[test]
fn regions_are_segregated() {
    let conn = open_db_in_memory().unwrap();
    let stores = map(&conn, MapRegion::STORES);
    let items = map(&conn, MapRegion::ITEMS);

    stores.insert("same-key", &"store row".to_string()).unwrap();
    items.insert("same-key", &"item row".to_string()).unwrap();

    assert_eq!(stores.get("same-key").unwrap().as_deref(), Some("store row"));
    assert_eq!(items.get("same-key").unwrap().as_deref(), Some("item row"));

    items.remove("same-key").unwrap();
    assert!(stores.contains_key("same-key").unwrap());
    assert_eq!(items.values().unwrap(), Vec::<String>::new());
}

#[test]
fn oversized_value_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let stores = map(&conn, MapRegion::STORES);

    let err = stores.insert("a", &"x".repeat(100)).unwrap_err();
    match err {
        StorageError::ValueTooLarge { region, len, max } => {
            assert_eq!(region, MapRegion::STORES);
            assert_eq!(len, 102);
            assert_eq!(max, 64);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(stores.is_empty().unwrap());
}

#[test]
fn oversized_key_cannot_be_stored_or_found() {
    let conn = open_db_in_memory().unwrap();
    let stores = map(&conn, MapRegion::STORES);
    let key = "k".repeat(45);

    let err = stores.insert(&key, &"v".to_string()).unwrap_err();
    assert!(matches!(err, StorageError::KeyTooLarge { len: 45, max: 44, .. }));
    assert_eq!(stores.get(&key).unwrap(), None);
    assert_eq!(stores.remove(&key).unwrap(), None);
}

#[test]
fn undecodable_row_surfaces_codec_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO map_entries (region, key, value) VALUES (1, 'broken', x'00ff');",
        [],
    )
    .unwrap();
    let items = map(&conn, MapRegion::ITEMS);

    let err = items.get("broken").unwrap_err();
    assert!(matches!(err, StorageError::Codec { region, .. } if region == MapRegion::ITEMS));
}

#[test]
fn rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match DurableMap::<String>::try_new(&conn, MapRegion::STORES, BOUNDS) {
        Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn rejects_connection_missing_value_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE map_entries (region INTEGER NOT NULL, key TEXT NOT NULL);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = DurableMap::<String>::try_new(&conn, MapRegion::STORES, BOUNDS);
    assert!(matches!(
        result,
        Err(StorageError::MissingRequiredColumn {
            table: "map_entries",
            column: "value"
        })
    ));
}
