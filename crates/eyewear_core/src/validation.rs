//! Pure payload checks run before any storage access.
//!
//! # Invariants
//! - No function here reads or writes storage.
//! - The first failing field is reported; later fields are not inspected.

use crate::model::item::ItemPayload;
use crate::model::store::StorePayload;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected input, surfaced to callers as `InvalidInput`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Identifier argument was empty.
    EmptyId(&'static str),
    /// Required text field was empty.
    MissingField(&'static str),
    /// Price was zero, negative or not a finite number.
    InvalidPrice(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId(argument) => write!(f, "invalid {argument}: must not be empty"),
            Self::MissingField(field) => write!(f, "missing required field `{field}` in payload"),
            Self::InvalidPrice(price) => {
                write!(f, "invalid price {price}: must be a positive number")
            }
        }
    }
}

impl Error for ValidationError {}

pub fn validate_id(value: &str, argument: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyId(argument));
    }
    Ok(())
}

/// A store payload is valid iff `name`, `location` and `image` are non-empty.
pub fn validate_store_payload(payload: &StorePayload) -> Result<(), ValidationError> {
    require_text("name", &payload.name)?;
    require_text("location", &payload.location)?;
    require_text("image", &payload.image)?;
    Ok(())
}

/// An item payload is valid iff its descriptive fields are non-empty and
/// `price` is finite and strictly positive.
pub fn validate_item_payload(payload: &ItemPayload) -> Result<(), ValidationError> {
    require_text("size", &payload.size)?;
    require_text("power", &payload.power)?;
    require_text("glassType", &payload.glass_type)?;
    require_text("gender", &payload.gender)?;
    if !payload.price.is_finite() || payload.price <= 0.0 {
        return Err(ValidationError::InvalidPrice(payload.price));
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
