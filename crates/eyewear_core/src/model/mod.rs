//! Catalog domain model.
//!
//! # Responsibility
//! - Define the two persisted entity kinds and their input payloads.
//! - Keep field-replacement and child-list rules next to the data.
//!
//! # Invariants
//! - `id`, `owner` and `created_at` never change after creation.
//! - A store's `item_ids` holds no duplicates.

pub mod item;
pub mod store;
