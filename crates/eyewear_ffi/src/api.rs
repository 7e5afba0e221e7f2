//! Exported catalog operations.
//!
//! # Responsibility
//! - Expose every catalog operation as a sync call with typed arguments.
//! - Classify each operation as a read-only query or a mutating update.
//! - Resolve the caller identity handed over by the transport per call.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are returned as `Err(String)` prefixed with the failure tag.

use eyewear_core::db::open_db;
use eyewear_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CatalogConfig, CatalogStorage, FixedCaller, Item, ItemPayload, ItemService, ServiceEnv,
    ServiceResult, Store, StorePayload, StoreService, SystemClock, UuidGenerator,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "eyewear_catalog.sqlite3";
const DB_PATH_ENV: &str = "EYEWEAR_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Whether an exported operation may mutate durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Update,
}

const EXPORTED_OPERATIONS: &[(&str, OperationKind)] = &[
    ("create_store", OperationKind::Update),
    ("get_store", OperationKind::Query),
    ("get_all_stores", OperationKind::Query),
    ("update_store", OperationKind::Update),
    ("delete_store", OperationKind::Update),
    ("get_items_in_store", OperationKind::Query),
    ("list_store_items", OperationKind::Query),
    ("add_item_to_store", OperationKind::Update),
    ("remove_item_from_store", OperationKind::Update),
    ("create_item", OperationKind::Update),
    ("get_item", OperationKind::Query),
    ("get_all_items", OperationKind::Query),
    ("update_item", OperationKind::Update),
    ("delete_item", OperationKind::Update),
];

/// Classification of an exported operation, `None` for unknown names.
#[flutter_rust_bridge::frb(sync)]
pub fn operation_kind(name: String) -> Option<OperationKind> {
    EXPORTED_OPERATIONS
        .iter()
        .find(|(operation, _)| *operation == name)
        .map(|(_, kind)| *kind)
}

/// Store record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image: String,
    /// Owner identity in textual form.
    pub owner: String,
    pub item_ids: Vec<String>,
    /// Nanoseconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: Option<u64>,
}

impl From<Store> for StoreView {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            location: store.location,
            image: store.image,
            owner: store.owner.to_string(),
            item_ids: store.item_ids,
            created_at: store.created_at,
            updated_at: store.updated_at,
        }
    }
}

/// Item record as returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: String,
    pub size: String,
    pub power: String,
    pub glass_type: String,
    pub gender: String,
    pub price: f64,
    pub store_id: String,
    pub created_at: u64,
    pub updated_at: Option<u64>,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            size: item.size,
            power: item.power,
            glass_type: item.glass_type,
            gender: item.gender,
            price: item.price,
            store_id: item.store_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Health check.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn create_store(caller: String, payload: StorePayload) -> Result<StoreView, String> {
    with_catalog(&caller, "create_store", |catalog| {
        catalog.stores.create_store(&payload).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn get_store(caller: String, id: String) -> Result<StoreView, String> {
    with_catalog(&caller, "get_store", |catalog| {
        catalog.stores.get_store(&id).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn get_all_stores(caller: String) -> Result<Vec<StoreView>, String> {
    with_catalog(&caller, "get_all_stores", |catalog| {
        let stores = catalog.stores.get_all_stores()?;
        Ok(stores.into_iter().map(Into::into).collect())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn update_store(
    caller: String,
    id: String,
    payload: StorePayload,
) -> Result<StoreView, String> {
    with_catalog(&caller, "update_store", |catalog| {
        catalog.stores.update_store(&id, &payload).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn delete_store(caller: String, id: String) -> Result<StoreView, String> {
    with_catalog(&caller, "delete_store", |catalog| {
        catalog.stores.delete_store(&id).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn get_items_in_store(caller: String, store_id: String) -> Result<Vec<String>, String> {
    with_catalog(&caller, "get_items_in_store", |catalog| {
        catalog.stores.get_items_in_store(&store_id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn list_store_items(caller: String, store_id: String) -> Result<Vec<ItemView>, String> {
    with_catalog(&caller, "list_store_items", |catalog| {
        let items = catalog.stores.list_store_items(&store_id)?;
        Ok(items.into_iter().map(Into::into).collect())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn add_item_to_store(
    caller: String,
    store_id: String,
    item_id: String,
) -> Result<StoreView, String> {
    with_catalog(&caller, "add_item_to_store", |catalog| {
        catalog
            .stores
            .add_item_to_store(&store_id, &item_id)
            .map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn remove_item_from_store(
    caller: String,
    store_id: String,
    item_id: String,
) -> Result<StoreView, String> {
    with_catalog(&caller, "remove_item_from_store", |catalog| {
        catalog
            .stores
            .remove_item_from_store(&store_id, &item_id)
            .map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn create_item(
    caller: String,
    store_id: String,
    payload: ItemPayload,
) -> Result<ItemView, String> {
    with_catalog(&caller, "create_item", |catalog| {
        catalog.items.create_item(&store_id, &payload).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn get_item(caller: String, id: String) -> Result<ItemView, String> {
    with_catalog(&caller, "get_item", |catalog| {
        catalog.items.get_item(&id).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn get_all_items(caller: String) -> Result<Vec<ItemView>, String> {
    with_catalog(&caller, "get_all_items", |catalog| {
        let items = catalog.items.get_all_items()?;
        Ok(items.into_iter().map(Into::into).collect())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn update_item(caller: String, id: String, payload: ItemPayload) -> Result<ItemView, String> {
    with_catalog(&caller, "update_item", |catalog| {
        catalog.items.update_item(&id, &payload).map(Into::into)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn delete_item(caller: String, id: String) -> Result<ItemView, String> {
    with_catalog(&caller, "delete_item", |catalog| {
        catalog.items.delete_item(&id).map(Into::into)
    })
}

struct Catalog<'conn> {
    stores: StoreService<'conn>,
    items: ItemService<'conn>,
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn caller_env(caller: &str) -> ServiceEnv {
    ServiceEnv::new(FixedCaller::from_token(caller), UuidGenerator, SystemClock)
}

fn with_catalog<T>(
    caller: &str,
    operation: &'static str,
    f: impl FnOnce(&Catalog<'_>) -> ServiceResult<T>,
) -> Result<T, String> {
    let config = CatalogConfig::from_env().map_err(|err| format!("{operation} failed: {err}"))?;
    let conn = open_db(resolve_db_path())
        .map_err(|err| format!("{operation} failed: catalog DB open failed: {err}"))?;
    let storage = CatalogStorage::try_new(&conn, &config)
        .map_err(|err| format!("{operation} failed: catalog storage init failed: {err}"))?;
    let catalog = Catalog {
        stores: StoreService::new(storage.clone(), caller_env(caller), &config),
        items: ItemService::new(storage, caller_env(caller), &config),
    };

    f(&catalog).map_err(|err| {
        warn!(
            "event=operation_failed module=ffi operation={operation} kind={}",
            err.kind().as_str()
        );
        format!("{}: {err}", err.kind().as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::{
        add_item_to_store, core_version, create_item, create_store, delete_item, delete_store,
        get_all_stores, get_item, get_items_in_store, get_store, init_logging, list_store_items,
        operation_kind, ping, remove_item_from_store, update_item, update_store, OperationKind,
        EXPORTED_OPERATIONS,
    };
    use eyewear_core::{ItemPayload, StorePayload};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    fn store_payload(name: &str) -> StorePayload {
        StorePayload {
            name: name.to_string(),
            location: "Pier 3".to_string(),
            image: "img.png".to_string(),
        }
    }

    fn item_payload(price: f64) -> ItemPayload {
        ItemPayload {
            size: "M".to_string(),
            power: "+1.5".to_string(),
            glass_type: "glass".to_string(),
            gender: "unisex".to_string(),
            price,
            store_id: String::new(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn every_operation_is_classified() {
        assert_eq!(EXPORTED_OPERATIONS.len(), 14);
        for name in ["get_store", "get_all_stores", "get_items_in_store", "get_item"] {
            assert_eq!(operation_kind(name.to_string()), Some(OperationKind::Query));
        }
        for name in ["create_store", "delete_store", "create_item", "update_item"] {
            assert_eq!(operation_kind(name.to_string()), Some(OperationKind::Update));
        }
        assert_eq!(operation_kind("drop_everything".to_string()), None);
    }

    #[test]
    fn store_and_item_round_trip_through_exports() {
        let owner = unique_token("owner");
        let name = unique_token("store");
        let store = create_store(owner.clone(), store_payload(&name)).expect("create store");
        assert_eq!(store.owner, owner);

        let item = create_item(owner.clone(), store.id.clone(), item_payload(49.99))
            .expect("create item");
        assert_eq!(item.store_id, store.id);

        let ids = get_items_in_store(owner.clone(), store.id.clone()).expect("items in store");
        assert_eq!(ids, vec![item.id.clone()]);
        let records = list_store_items(owner.clone(), store.id.clone()).expect("store items");
        assert_eq!(records, vec![item.clone()]);

        let fetched = get_store(owner.clone(), store.id.clone()).expect("get store");
        assert_eq!(fetched.name, name);
        assert!(get_all_stores(owner.clone())
            .expect("all stores")
            .iter()
            .any(|candidate| candidate.id == store.id));

        let updated = update_item(owner.clone(), item.id.clone(), item_payload(55.0))
            .expect("update item");
        assert_eq!(updated.price, 55.0);
        assert!(updated.updated_at.is_some());

        let renamed = update_store(owner.clone(), store.id.clone(), store_payload("Renamed"))
            .expect("update store");
        assert_eq!(renamed.item_ids, vec![item.id.clone()]);

        delete_item(owner.clone(), item.id.clone()).expect("delete item");
        let err = get_item(owner.clone(), item.id.clone()).expect_err("item gone");
        assert!(err.starts_with("NotFound:"), "{err}");

        delete_store(owner.clone(), store.id.clone()).expect("delete store");
    }

    #[test]
    fn delete_by_stranger_is_unauthorized() {
        let owner = unique_token("owner");
        let stranger = unique_token("stranger");
        let store = create_store(owner.clone(), store_payload("Lakeside")).expect("create store");

        let err = delete_store(stranger, store.id.clone()).expect_err("stranger delete");
        assert!(err.starts_with("Unauthorized:"), "{err}");
        assert!(get_store(owner.clone(), store.id.clone()).is_ok());

        delete_store(owner, store.id).expect("owner delete");
    }

    #[test]
    fn invalid_input_is_reported_with_tag() {
        let caller = unique_token("caller");
        let err = create_store(caller.clone(), StorePayload::default()).expect_err("invalid");
        assert!(err.starts_with("InvalidInput:"), "{err}");

        let err = create_item(caller.clone(), "no-such-store".to_string(), item_payload(1.0))
            .expect_err("missing store");
        assert!(err.starts_with("NotFound:"), "{err}");

        let err = add_item_to_store(caller.clone(), String::new(), "x".to_string())
            .expect_err("empty store id");
        assert!(err.starts_with("InvalidInput:"), "{err}");
        let err = remove_item_from_store(caller, "no-such-store".to_string(), "x".to_string())
            .expect_err("missing store");
        assert!(err.starts_with("NotFound:"), "{err}");
    }
}
