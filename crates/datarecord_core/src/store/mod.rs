//! Storage layer: the single-table record store.
//!
//! # Responsibility
//! - Persist records and own their state exclusively.
//! - Notify live views after every committed change.
//!
//! # Invariants
//! - Each call commits in one transaction or not at all.
//! - Inserts abort on primary-key conflict; updates and deletes skip
//!   missing ids without error.
//! - Storage never validates record text.

pub mod record_store;
