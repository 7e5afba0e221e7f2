//! Catalog configuration: storage bounds and explicit mutation policies.
//!
//! # Responsibility
//! - Hold the byte bounds applied by each durable map region.
//! - Make the authorization and reference-integrity policies explicit.
//! - Parse overrides from environment variables.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable selecting the [`AuthorizationPolicy`].
pub const AUTHORIZATION_ENV: &str = "EYEWEAR_AUTHORIZATION";
/// Environment variable selecting the [`ReferencePolicy`].
pub const REFERENCES_ENV: &str = "EYEWEAR_REFERENCES";

/// Default key bound, wide enough for a canonical UUID string.
pub const DEFAULT_MAX_KEY_BYTES: usize = 44;
/// Default encoded value bound for items.
pub const DEFAULT_ITEM_VALUE_BYTES: usize = 1024;
/// Default encoded value bound for stores, which also carry their item ids.
///
/// Each listed id costs about 39 bytes of JSON, so a store at this bound
/// holds roughly 200 items; further `create_item` calls on it fail with
/// `StorageError::ValueTooLarge`. Raise `CatalogConfig::store_bounds` for
/// larger stores.
pub const DEFAULT_STORE_VALUE_BYTES: usize = 8 * 1024;

/// Byte bounds enforced by one durable map region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBounds {
    pub max_key_bytes: usize,
    pub max_value_bytes: usize,
}

impl MapBounds {
    pub const fn new(max_key_bytes: usize, max_value_bytes: usize) -> Self {
        Self {
            max_key_bytes,
            max_value_bytes,
        }
    }
}

/// Which mutations require the caller to own the affected store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationPolicy {
    /// Only store deletion is owner-gated.
    #[default]
    StoreDeleteOnly,
    /// Every store mutation requires the store owner, and every item
    /// mutation requires the owner of the item's store.
    OwnerForAllMutations,
}

impl AuthorizationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StoreDeleteOnly => "store_delete_only",
            Self::OwnerForAllMutations => "owner_for_all_mutations",
        }
    }
}

/// How deletes treat references held by the other map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Deletes touch only their own map; dangling references are tolerated.
    #[default]
    Orphan,
    /// Deleting a store deletes its items; deleting an item detaches it from
    /// its store. Both happen in the same transaction as the delete.
    Cascade,
}

impl ReferencePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orphan => "orphan",
            Self::Cascade => "cascade",
        }
    }
}

/// Full catalog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    pub authorization: AuthorizationPolicy,
    pub references: ReferencePolicy,
    pub store_bounds: MapBounds,
    pub item_bounds: MapBounds,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            authorization: AuthorizationPolicy::default(),
            references: ReferencePolicy::default(),
            store_bounds: MapBounds::new(DEFAULT_MAX_KEY_BYTES, DEFAULT_STORE_VALUE_BYTES),
            item_bounds: MapBounds::new(DEFAULT_MAX_KEY_BYTES, DEFAULT_ITEM_VALUE_BYTES),
        }
    }
}

impl CatalogConfig {
    /// Defaults overridden by [`AUTHORIZATION_ENV`] and [`REFERENCES_ENV`].
    ///
    /// Unset or blank variables keep the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(AUTHORIZATION_ENV).filter(|v| !v.trim().is_empty()) {
            config.authorization = parse_authorization_policy(&raw)?;
        }
        if let Some(raw) = lookup(REFERENCES_ENV).filter(|v| !v.trim().is_empty()) {
            config.references = parse_reference_policy(&raw)?;
        }
        Ok(config)
    }
}

pub fn parse_authorization_policy(value: &str) -> Result<AuthorizationPolicy, ConfigError> {
    match value.trim() {
        "store_delete_only" => Ok(AuthorizationPolicy::StoreDeleteOnly),
        "owner_for_all_mutations" => Ok(AuthorizationPolicy::OwnerForAllMutations),
        other => Err(ConfigError::UnsupportedValue {
            setting: AUTHORIZATION_ENV,
            value: other.to_string(),
        }),
    }
}

pub fn parse_reference_policy(value: &str) -> Result<ReferencePolicy, ConfigError> {
    match value.trim() {
        "orphan" => Ok(ReferencePolicy::Orphan),
        "cascade" => Ok(ReferencePolicy::Cascade),
        other => Err(ConfigError::UnsupportedValue {
            setting: REFERENCES_ENV,
            value: other.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedValue { setting: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedValue { setting, value } => {
                write!(f, "unsupported value `{value}` for {setting}")
            }
        }
    }
}

impl Error for ConfigError {}
