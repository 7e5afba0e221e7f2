//! Catalog use-case services.
//!
//! # Responsibility
//! - Validate input, enforce ownership, and drive the durable maps.
//! - Map every failure onto one tagged [`ServiceError`].
//!
//! # Invariants
//! - Validation runs before any write.
//! - Services share no in-memory state; they coordinate only through storage.
//! - Read-modify-write of a stored row runs inside `CatalogStorage::atomically`.

use crate::config::AuthorizationPolicy;
use crate::identity::CallerIdentity;
use crate::model::item::ItemId;
use crate::model::store::{Store, StoreId};
use crate::storage::StorageError;
use crate::validation::ValidationError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_service;
pub mod store_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure tag paired with every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unauthorized,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::NotFound => "NotFound",
            Self::Unauthorized => "Unauthorized",
            Self::Storage => "Storage",
        }
    }
}

/// Protected catalog mutations, used in authorization decisions and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    UpdateStore,
    DeleteStore,
    AddItemToStore,
    RemoveItemFromStore,
    CreateItem,
    UpdateItem,
    DeleteItem,
}

impl Mutation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdateStore => "update store",
            Self::DeleteStore => "delete store",
            Self::AddItemToStore => "add item to store",
            Self::RemoveItemFromStore => "remove item from store",
            Self::CreateItem => "create item",
            Self::UpdateItem => "update item",
            Self::DeleteItem => "delete item",
        }
    }

    /// Store deletion is always owner-gated; the rest only under
    /// [`AuthorizationPolicy::OwnerForAllMutations`].
    pub fn requires_owner(self, policy: AuthorizationPolicy) -> bool {
        self == Self::DeleteStore || policy == AuthorizationPolicy::OwnerForAllMutations
    }
}

/// Error returned by every catalog operation.
#[derive(Debug)]
pub enum ServiceError {
    InvalidInput(ValidationError),
    StoreNotFound(StoreId),
    ItemNotFound(ItemId),
    /// Caller is not the owner of the store guarding this mutation.
    Unauthorized {
        mutation: Mutation,
        store_id: StoreId,
    },
    Storage(StorageError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::StoreNotFound(_) | Self::ItemNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::StoreNotFound(id) => write!(f, "eyewear store with id={id} not found"),
            Self::ItemNotFound(id) => write!(f, "eyewear item with id={id} not found"),
            Self::Unauthorized { mutation, store_id } => write!(
                f,
                "caller does not have the right to {} (store id={store_id})",
                mutation.as_str()
            ),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Checks `caller` against the owner of `store` when `mutation` is gated.
pub(crate) fn authorize(
    policy: AuthorizationPolicy,
    mutation: Mutation,
    store: &Store,
    caller: &CallerIdentity,
) -> ServiceResult<()> {
    if !mutation.requires_owner(policy) || store.is_owned_by(caller) {
        return Ok(());
    }
    warn!(
        "event=authorization_denied module=service mutation={} store_id={}",
        mutation.as_str(),
        store.id
    );
    Err(ServiceError::Unauthorized {
        mutation,
        store_id: store.id.clone(),
    })
}
