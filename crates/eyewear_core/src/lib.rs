//! Core catalog logic for the eyewear marketplace.
//! This crate is the single source of truth for store/item invariants.

pub mod config;
pub mod db;
pub mod env;
pub mod identity;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod validation;

pub use config::{AuthorizationPolicy, CatalogConfig, ConfigError, MapBounds, ReferencePolicy};
pub use env::{Clock, IdGenerator, ServiceEnv, SystemClock, Timestamp, UuidGenerator};
pub use identity::{CallerIdentity, FixedCaller, IdentityGate};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Item, ItemId, ItemPayload};
pub use model::store::{Store, StoreId, StorePayload};
pub use service::item_service::ItemService;
pub use service::store_service::StoreService;
pub use service::{ErrorKind, Mutation, ServiceError, ServiceResult};
pub use storage::{CatalogStorage, DurableMap, MapRegion, StorageError, StorageResult};
pub use validation::ValidationError;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
