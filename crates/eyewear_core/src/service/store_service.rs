//! Store aggregate service.
//!
//! # Responsibility
//! - CRUD for stores, including the owner captured at creation.
//! - Maintain each store's child item id list.
//!
//! # Invariants
//! - `owner` is set once from the resolved caller and never reassigned.
//! - Updates replace `name`, `location`, `image` only.
//! - Store deletion always requires the caller to be the owner.

use crate::config::{AuthorizationPolicy, CatalogConfig, ReferencePolicy};
use crate::env::ServiceEnv;
use crate::model::item::{Item, ItemId};
use crate::model::store::{Store, StorePayload};
use crate::service::{authorize, Mutation, ServiceError, ServiceResult};
use crate::storage::CatalogStorage;
use crate::validation::{validate_id, validate_store_payload};
use log::info;

/// Use-case facade for the parent entity.
pub struct StoreService<'conn> {
    storage: CatalogStorage<'conn>,
    env: ServiceEnv,
    authorization: AuthorizationPolicy,
    references: ReferencePolicy,
}

impl<'conn> StoreService<'conn> {
    pub fn new(storage: CatalogStorage<'conn>, env: ServiceEnv, config: &CatalogConfig) -> Self {
        Self {
            storage,
            env,
            authorization: config.authorization,
            references: config.references,
        }
    }

    /// Creates a store owned by the current caller, with no items.
    pub fn create_store(&self, payload: &StorePayload) -> ServiceResult<Store> {
        validate_store_payload(payload)?;

        let store = Store::new(
            self.env.ids.next_id(),
            payload,
            self.env.identity.resolve_caller(),
            self.env.clock.now(),
        );
        self.storage.stores().insert(&store.id, &store)?;

        info!(
            "event=store_create module=store_service status=ok store_id={}",
            store.id
        );
        Ok(store)
    }

    pub fn get_store(&self, id: &str) -> ServiceResult<Store> {
        validate_id(id, "id")?;
        self.load(id)
    }

    /// Every stored store in key order; empty when none exist.
    pub fn get_all_stores(&self) -> ServiceResult<Vec<Store>> {
        Ok(self.storage.stores().values()?)
    }

    /// Replaces the descriptive fields and stamps `updated_at`.
    pub fn update_store(&self, id: &str, payload: &StorePayload) -> ServiceResult<Store> {
        validate_id(id, "id")?;
        validate_store_payload(payload)?;

        let store = self.storage.atomically(|storage| {
            let mut store = load_store(storage, id)?;
            self.authorize(Mutation::UpdateStore, &store)?;
            store.apply_update(payload, self.env.clock.now());
            storage.stores().insert(&store.id, &store)?;
            Ok::<_, ServiceError>(store)
        })?;

        info!(
            "event=store_update module=store_service status=ok store_id={}",
            store.id
        );
        Ok(store)
    }

    /// Removes a store owned by the caller and returns the removed record.
    ///
    /// Under [`ReferencePolicy::Cascade`] the store's items are deleted in the
    /// same transaction; otherwise they are left in place.
    pub fn delete_store(&self, id: &str) -> ServiceResult<Store> {
        validate_id(id, "id")?;

        let (store, removed_items) = self.storage.atomically(|storage| {
            let store = load_store(storage, id)?;
            self.authorize(Mutation::DeleteStore, &store)?;

            let removed = match self.references {
                ReferencePolicy::Orphan => 0,
                ReferencePolicy::Cascade => {
                    let mut doomed: Vec<ItemId> = storage
                        .items()
                        .values()?
                        .into_iter()
                        .filter(|item| item.store_id == store.id)
                        .map(|item| item.id)
                        .collect();
                    for listed in &store.item_ids {
                        if !doomed.contains(listed) {
                            doomed.push(listed.clone());
                        }
                    }

                    let mut removed = 0usize;
                    for item_id in &doomed {
                        if storage.items().remove(item_id)?.is_some() {
                            removed += 1;
                        }
                    }
                    removed
                }
            };
            storage.stores().remove(&store.id)?;
            Ok::<_, ServiceError>((store, removed))
        })?;

        info!(
            "event=store_delete module=store_service status=ok store_id={} references={} removed_items={}",
            store.id,
            self.references.as_str(),
            removed_items
        );
        Ok(store)
    }

    /// Item ids recorded on the store, in creation order.
    pub fn get_items_in_store(&self, store_id: &str) -> ServiceResult<Vec<ItemId>> {
        validate_id(store_id, "storeId")?;
        Ok(self.load(store_id)?.item_ids)
    }

    /// Item records whose `store_id` points at this store, scanned from the
    /// item map.
    pub fn list_store_items(&self, store_id: &str) -> ServiceResult<Vec<Item>> {
        validate_id(store_id, "storeId")?;
        let store = self.load(store_id)?;
        let items = self
            .storage
            .items()
            .values()?
            .into_iter()
            .filter(|item| item.store_id == store.id)
            .collect();
        Ok(items)
    }

    /// Appends `item_id` to the store's list. The id is trusted, not looked up.
    pub fn add_item_to_store(&self, store_id: &str, item_id: &str) -> ServiceResult<Store> {
        validate_id(store_id, "storeId")?;
        validate_id(item_id, "itemId")?;

        self.storage.atomically(|storage| {
            let mut store = load_store(storage, store_id)?;
            self.authorize(Mutation::AddItemToStore, &store)?;
            if store.attach_item(item_id) {
                storage.stores().insert(&store.id, &store)?;
            }
            Ok::<_, ServiceError>(store)
        })
    }

    /// Filters `item_id` out of the store's list. The item map is untouched.
    pub fn remove_item_from_store(&self, store_id: &str, item_id: &str) -> ServiceResult<Store> {
        validate_id(store_id, "storeId")?;
        validate_id(item_id, "itemId")?;

        self.storage.atomically(|storage| {
            let mut store = load_store(storage, store_id)?;
            self.authorize(Mutation::RemoveItemFromStore, &store)?;
            if store.detach_item(item_id) {
                storage.stores().insert(&store.id, &store)?;
            }
            Ok::<_, ServiceError>(store)
        })
    }

    fn load(&self, id: &str) -> ServiceResult<Store> {
        load_store(&self.storage, id)
    }

    fn authorize(&self, mutation: Mutation, store: &Store) -> ServiceResult<()> {
        authorize(
            self.authorization,
            mutation,
            store,
            &self.env.identity.resolve_caller(),
        )
    }
}

/// Store lookup shared by plain reads and read-modify-write transactions.
pub(crate) fn load_store(storage: &CatalogStorage<'_>, id: &str) -> ServiceResult<Store> {
    storage
        .stores()
        .get(id)?
        .ok_or_else(|| ServiceError::StoreNotFound(id.to_string()))
}
