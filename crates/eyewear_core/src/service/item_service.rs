//! Item service.
//!
//! # Responsibility
//! - CRUD for items, each referencing its owning store by id.
//! - Keep the owning store's item list in step with item creation.
//!
//! # Invariants
//! - An item is only created under a store that exists at that moment.
//! - The item insert and the store list append commit together or not at all.
//! - Store rows are only rewritten from a read taken inside the same transaction.
//! - Updates never change `id`, `store_id` or `created_at`.

use crate::config::{AuthorizationPolicy, CatalogConfig, ReferencePolicy};
use crate::env::ServiceEnv;
use crate::model::item::{Item, ItemPayload};
use crate::model::store::StoreId;
use crate::service::store_service::load_store;
use crate::service::{authorize, Mutation, ServiceError, ServiceResult};
use crate::storage::CatalogStorage;
use crate::validation::{validate_id, validate_item_payload};
use log::{info, warn};

/// Use-case facade for the child entity.
pub struct ItemService<'conn> {
    storage: CatalogStorage<'conn>,
    env: ServiceEnv,
    authorization: AuthorizationPolicy,
    references: ReferencePolicy,
}

impl<'conn> ItemService<'conn> {
    pub fn new(storage: CatalogStorage<'conn>, env: ServiceEnv, config: &CatalogConfig) -> Self {
        Self {
            storage,
            env,
            authorization: config.authorization,
            references: config.references,
        }
    }

    /// Creates an item under `store_id` and appends it to that store's list.
    ///
    /// Checks run in order: empty `store_id`, missing store, invalid payload.
    /// The store is read and rewritten inside one transaction.
    pub fn create_item(&self, store_id: &str, payload: &ItemPayload) -> ServiceResult<Item> {
        validate_id(store_id, "storeId")?;

        let item = self.storage.atomically(|storage| {
            let mut store = load_store(storage, store_id)?;
            validate_item_payload(payload)?;
            authorize(
                self.authorization,
                Mutation::CreateItem,
                &store,
                &self.env.identity.resolve_caller(),
            )?;

            let item = Item::new(
                self.env.ids.next_id(),
                store.id.clone(),
                payload,
                self.env.clock.now(),
            );
            store.attach_item(&item.id);
            storage.items().insert(&item.id, &item)?;
            storage.stores().insert(&store.id, &store)?;
            Ok::<_, ServiceError>(item)
        })?;

        info!(
            "event=item_create module=item_service status=ok item_id={} store_id={}",
            item.id, item.store_id
        );
        Ok(item)
    }

    pub fn get_item(&self, id: &str) -> ServiceResult<Item> {
        validate_id(id, "id")?;
        self.load(id)
    }

    pub fn get_all_items(&self) -> ServiceResult<Vec<Item>> {
        Ok(self.storage.items().values()?)
    }

    /// Replaces descriptive fields and price, stamping `updated_at`.
    pub fn update_item(&self, id: &str, payload: &ItemPayload) -> ServiceResult<Item> {
        validate_id(id, "id")?;
        validate_item_payload(payload)?;

        let item = self.storage.atomically(|storage| {
            let mut item = load_item(storage, id)?;
            self.authorize(storage, Mutation::UpdateItem, &item.store_id)?;
            item.apply_update(payload, self.env.clock.now());
            storage.items().insert(&item.id, &item)?;
            Ok::<_, ServiceError>(item)
        })?;

        info!(
            "event=item_update module=item_service status=ok item_id={}",
            item.id
        );
        Ok(item)
    }

    /// Removes an item and returns the removed record.
    ///
    /// Under [`ReferencePolicy::Cascade`] the id is also dropped from the
    /// owning store's list in the same transaction.
    pub fn delete_item(&self, id: &str) -> ServiceResult<Item> {
        validate_id(id, "id")?;

        let item = self.storage.atomically(|storage| {
            let item = load_item(storage, id)?;
            self.authorize(storage, Mutation::DeleteItem, &item.store_id)?;
            storage.items().remove(&item.id)?;
            if self.references == ReferencePolicy::Cascade {
                if let Some(mut store) = storage.stores().get(&item.store_id)? {
                    if store.detach_item(&item.id) {
                        storage.stores().insert(&store.id, &store)?;
                    }
                }
            }
            Ok::<_, ServiceError>(item)
        })?;

        info!(
            "event=item_delete module=item_service status=ok item_id={} references={}",
            item.id,
            self.references.as_str()
        );
        Ok(item)
    }

    fn load(&self, id: &str) -> ServiceResult<Item> {
        load_item(&self.storage, id)
    }

    /// Ownership check against the item's store. When the store no longer
    /// exists ownership cannot be established and gated mutations are denied.
    fn authorize(
        &self,
        storage: &CatalogStorage<'_>,
        mutation: Mutation,
        store_id: &StoreId,
    ) -> ServiceResult<()> {
        if !mutation.requires_owner(self.authorization) {
            return Ok(());
        }
        match storage.stores().get(store_id)? {
            Some(store) => authorize(
                self.authorization,
                mutation,
                &store,
                &self.env.identity.resolve_caller(),
            ),
            None => {
                warn!(
                    "event=authorization_denied module=item_service mutation={} store_id={} reason=store_missing",
                    mutation.as_str(),
                    store_id
                );
                Err(ServiceError::Unauthorized {
                    mutation,
                    store_id: store_id.clone(),
                })
            }
        }
    }
}

fn load_item(storage: &CatalogStorage<'_>, id: &str) -> ServiceResult<Item> {
    storage
        .items()
        .get(id)?
        .ok_or_else(|| ServiceError::ItemNotFound(id.to_string()))
}
