//! Exported catalog operations for host bindings.

pub mod api;
