//! Caller identity resolution for ownership checks.
//!
//! # Responsibility
//! - Represent the externally verified caller as an opaque value.
//! - Resolve the caller once per operation; no sessions, no expiry.
//!
//! # Invariants
//! - Resolution always yields an identity; the transport guarantees one.
//! - Ownership comparison is plain structural equality.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Textual form of the platform's anonymous principal.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Opaque, already-verified identity of the party invoking an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identity used when the transport reports no authenticated caller.
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CallerIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves who is calling the current operation.
pub trait IdentityGate {
    fn resolve_caller(&self) -> CallerIdentity;
}

/// Gate bound to one identity handed over by the transport for a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCaller {
    identity: CallerIdentity,
}

impl FixedCaller {
    pub fn new(identity: CallerIdentity) -> Self {
        Self { identity }
    }

    /// Gate for a raw identity string; blank input maps to the anonymous principal.
    pub fn from_token(token: &str) -> Self {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Self::new(CallerIdentity::anonymous());
        }
        Self::new(CallerIdentity::new(trimmed))
    }
}

impl IdentityGate for FixedCaller {
    fn resolve_caller(&self) -> CallerIdentity {
        self.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{CallerIdentity, FixedCaller, IdentityGate};

    #[test]
    fn fixed_caller_resolves_the_bound_identity_every_time() {
        let gate = FixedCaller::new(CallerIdentity::new("aaaaa-aa"));
        assert_eq!(gate.resolve_caller(), CallerIdentity::new("aaaaa-aa"));
        assert_eq!(gate.resolve_caller(), gate.resolve_caller());
    }

    #[test]
    fn blank_token_maps_to_anonymous() {
        let gate = FixedCaller::from_token("   ");
        assert!(gate.resolve_caller().is_anonymous());
    }

    #[test]
    fn identities_compare_structurally() {
        assert_eq!(CallerIdentity::new("owner"), CallerIdentity::new("owner"));
        assert_ne!(CallerIdentity::new("owner"), CallerIdentity::new("Owner"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&CallerIdentity::new("rrkah-fqaaa")).unwrap();
        assert_eq!(json, "\"rrkah-fqaaa\"");
    }
}
