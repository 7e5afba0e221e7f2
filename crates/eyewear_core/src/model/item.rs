//! Eyewear item (child entity) model.

use crate::env::Timestamp;
use crate::model::store::StoreId;
use serde::{Deserialize, Serialize};

/// Item identifier (canonical UUID string for generated ids).
pub type ItemId = String;

/// One sellable eyewear unit belonging to exactly one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub size: String,
    pub power: String,
    pub glass_type: String,
    pub gender: String,
    /// Always `> 0` once persisted.
    pub price: f64,
    /// Owning store at creation time. Not re-checked on later reads.
    pub store_id: StoreId,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Caller-supplied fields for create and update.
///
/// `store_id` mirrors the external payload shape only: creation takes the
/// owning store from its own argument and updates keep the persisted one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub size: String,
    pub power: String,
    pub glass_type: String,
    pub gender: String,
    pub price: f64,
    #[serde(default)]
    pub store_id: StoreId,
}

impl Item {
    pub fn new(
        id: ItemId,
        store_id: StoreId,
        payload: &ItemPayload,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            size: payload.size.clone(),
            power: payload.power.clone(),
            glass_type: payload.glass_type.clone(),
            gender: payload.gender.clone(),
            price: payload.price,
            store_id,
            created_at,
            updated_at: None,
        }
    }

    /// Replaces descriptive fields and price; `id`, `store_id` and
    /// `created_at` are kept.
    pub fn apply_update(&mut self, payload: &ItemPayload, now: Timestamp) {
        self.size = payload.size.clone();
        self.power = payload.power.clone();
        self.glass_type = payload.glass_type.clone();
        self.gender = payload.gender.clone();
        self.price = payload.price;
        self.updated_at = Some(now);
    }
}
