#![allow(dead_code)]

use eyewear_core::{
    CallerIdentity, CatalogConfig, CatalogStorage, Clock, FixedCaller, IdGenerator, ItemPayload,
    ItemService, ServiceEnv, StorePayload, StoreService,
};
use rusqlite::Connection;
use std::cell::Cell;

/// Deterministic ids: `<prefix>-1`, `<prefix>-2`, ...
pub struct SequentialIds {
    prefix: String,
    issued: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: Cell::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let next = self.issued.get() + 1;
        self.issued.set(next);
        format!("{}-{next}", self.prefix)
    }
}

/// Clock advancing by one nanosecond per reading.
pub struct TickingClock {
    now: Cell<u64>,
}

impl TickingClock {
    pub fn starting_at(start: u64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> u64 {
        let now = self.now.get() + 1;
        self.now.set(now);
        now
    }
}

pub fn env_for(caller: &str, id_prefix: &str) -> ServiceEnv {
    ServiceEnv::new(
        FixedCaller::new(CallerIdentity::new(caller)),
        SequentialIds::new(id_prefix),
        TickingClock::starting_at(1_000),
    )
}

/// Store and item services acting on behalf of one caller.
pub struct Catalog<'conn> {
    pub stores: StoreService<'conn>,
    pub items: ItemService<'conn>,
    pub storage: CatalogStorage<'conn>,
}

pub fn catalog_as<'conn>(
    conn: &'conn Connection,
    caller: &str,
    config: &CatalogConfig,
) -> Catalog<'conn> {
    let storage = CatalogStorage::try_new(conn, config).unwrap();
    // Prefix ids by caller so two catalogs on one connection never collide.
    let store_prefix = format!("{caller}-store");
    let item_prefix = format!("{caller}-item");
    Catalog {
        stores: StoreService::new(storage.clone(), env_for(caller, &store_prefix), config),
        items: ItemService::new(storage.clone(), env_for(caller, &item_prefix), config),
        storage,
    }
}

pub fn catalog(conn: &Connection) -> Catalog<'_> {
    catalog_as(conn, "alice", &CatalogConfig::default())
}

pub fn store_payload(name: &str) -> StorePayload {
    StorePayload {
        name: name.to_string(),
        location: "Pier 3".to_string(),
        image: "img.png".to_string(),
    }
}

pub fn item_payload(price: f64) -> ItemPayload {
    ItemPayload {
        size: "M".to_string(),
        power: "+1.5".to_string(),
        glass_type: "glass".to_string(),
        gender: "unisex".to_string(),
        price,
        store_id: String::new(),
    }
}
