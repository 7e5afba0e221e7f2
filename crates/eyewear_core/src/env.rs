//! Injectable runtime capabilities: identifier generation, clock, caller.
//!
//! Services receive these through [`ServiceEnv`] instead of reaching for
//! process-wide primitives, so tests can pin ids and time.

use crate::identity::{CallerIdentity, FixedCaller, IdentityGate};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// Produces fresh entity identifiers.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Random 128-bit identifiers in canonical hyphenated form.
///
/// Unique with overwhelming probability; collisions are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Source of "now" for entity timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock; a pre-epoch system time reads as `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// Capabilities one service instance runs with.
pub struct ServiceEnv {
    pub identity: Box<dyn IdentityGate>,
    pub ids: Box<dyn IdGenerator>,
    pub clock: Box<dyn Clock>,
}

impl ServiceEnv {
    pub fn new(
        identity: impl IdentityGate + 'static,
        ids: impl IdGenerator + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            identity: Box::new(identity),
            ids: Box::new(ids),
            clock: Box::new(clock),
        }
    }

    /// Production wiring: UUID v4 ids, wall clock, one verified caller.
    pub fn system(caller: CallerIdentity) -> Self {
        Self::new(FixedCaller::new(caller), UuidGenerator, SystemClock)
    }
}
