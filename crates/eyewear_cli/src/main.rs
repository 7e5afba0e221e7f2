//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `eyewear_core` linkage end-to-end against an in-memory database.
//! - Keep output line-oriented for quick local sanity checks.

use eyewear_core::db::open_db_in_memory;
use eyewear_core::{
    CallerIdentity, CatalogConfig, CatalogStorage, ItemPayload, ItemService, ServiceEnv,
    StorePayload, StoreService,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("eyewear_core ping={}", eyewear_core::ping());
    println!("eyewear_core version={}", eyewear_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("eyewear_cli smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig::from_env()?;
    let conn = open_db_in_memory()?;
    let storage = CatalogStorage::try_new(&conn, &config)?;
    let caller = CallerIdentity::new("smoke-owner");
    let stores = StoreService::new(
        storage.clone(),
        ServiceEnv::system(caller.clone()),
        &config,
    );
    let items = ItemService::new(storage, ServiceEnv::system(caller), &config);

    let store = stores.create_store(&StorePayload {
        name: "Lakeside".to_string(),
        location: "Pier 3".to_string(),
        image: "lakeside.png".to_string(),
    })?;
    println!("store id={} owner={}", store.id, store.owner);

    let item = items.create_item(
        &store.id,
        &ItemPayload {
            size: "M".to_string(),
            power: "+1.5".to_string(),
            glass_type: "glass".to_string(),
            gender: "unisex".to_string(),
            price: 49.99,
            store_id: String::new(),
        },
    )?;
    println!("item id={} store_id={}", item.id, item.store_id);

    let listed = stores.get_items_in_store(&store.id)?;
    println!("store items={}", listed.len());
    println!(
        "policy authorization={} references={}",
        config.authorization.as_str(),
        config.references.as_str()
    );
    Ok(())
}
