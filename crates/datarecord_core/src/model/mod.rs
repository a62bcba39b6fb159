//! Domain model for persisted records.
//!
//! # Responsibility
//! - Define the single entity stored by the core.
//! - Provide the caller-side text check used by front-ends.
//!
//! # Invariants
//! - A record is identified only by its numeric `RecordId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod record;
