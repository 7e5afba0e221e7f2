//! Eyewear store (parent entity) model.

use crate::env::Timestamp;
use crate::identity::CallerIdentity;
use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};

/// Store identifier (canonical UUID string for generated ids).
pub type StoreId = String;

/// A selling location owning zero or more items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub location: String,
    pub image: String,
    /// Caller that created the store; gates protected mutations.
    pub owner: CallerIdentity,
    /// Items created under this store, in creation order.
    pub item_ids: Vec<ItemId>,
    pub created_at: Timestamp,
    /// `None` until the first successful update.
    pub updated_at: Option<Timestamp>,
}

/// Caller-supplied fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorePayload {
    pub name: String,
    pub location: String,
    pub image: String,
}

impl Store {
    /// Builds a fresh store with an empty item list.
    pub fn new(
        id: StoreId,
        payload: &StorePayload,
        owner: CallerIdentity,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name: payload.name.clone(),
            location: payload.location.clone(),
            image: payload.image.clone(),
            owner,
            item_ids: Vec::new(),
            created_at,
            updated_at: None,
        }
    }

    /// Replaces descriptive fields; identity, owner and item list are kept.
    pub fn apply_update(&mut self, payload: &StorePayload, now: Timestamp) {
        self.name = payload.name.clone();
        self.location = payload.location.clone();
        self.image = payload.image.clone();
        self.updated_at = Some(now);
    }

    pub fn is_owned_by(&self, caller: &CallerIdentity) -> bool {
        &self.owner == caller
    }

    /// Appends `item_id` unless already listed. Returns whether it was added.
    pub fn attach_item(&mut self, item_id: &str) -> bool {
        if self.item_ids.iter().any(|id| id == item_id) {
            return false;
        }
        self.item_ids.push(item_id.to_string());
        true
    }

    /// Drops every occurrence of `item_id`. Returns whether anything changed.
    pub fn detach_item(&mut self, item_id: &str) -> bool {
        let before = self.item_ids.len();
        self.item_ids.retain(|id| id != item_id);
        self.item_ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::{Store, StorePayload};
    use crate::identity::CallerIdentity;

    fn sample() -> Store {
        let payload = StorePayload {
            name: "Lakeside".to_string(),
            location: "Pier 3".to_string(),
            image: "img.png".to_string(),
        };
        Store::new("s-1".to_string(), &payload, CallerIdentity::new("owner"), 10)
    }

    #[test]
    fn new_store_starts_empty_and_unmodified() {
        let store = sample();
        assert!(store.item_ids.is_empty());
        assert_eq!(store.updated_at, None);
        assert_eq!(store.created_at, 10);
    }

    #[test]
    fn attach_is_idempotent_and_detach_removes() {
        let mut store = sample();
        assert!(store.attach_item("i-1"));
        assert!(!store.attach_item("i-1"));
        assert!(store.attach_item("i-2"));
        assert_eq!(store.item_ids, vec!["i-1", "i-2"]);

        assert!(store.detach_item("i-1"));
        assert!(!store.detach_item("i-1"));
        assert_eq!(store.item_ids, vec!["i-2"]);
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("itemIds").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["owner"], "owner");
    }
}
