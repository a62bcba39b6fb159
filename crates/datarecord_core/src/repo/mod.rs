//! Repository facade over the record store.
//!
//! # Responsibility
//! - Give the coordinator a stable surface independent of store details.
//!
//! # Invariants
//! - Pure forwarding: no validation, transformation or error translation.

pub mod record_repo;
