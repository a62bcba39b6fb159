//! Presentation coordinator for record screens.
//!
//! # Responsibility
//! - Hold the list live view for the lifetime of the coordinator.
//! - Dispatch writes without blocking the caller.
//!
//! # Invariants
//! - Write results are never translated; a dispatched insert that conflicts
//!   yields `StoreError::Conflict` to whoever awaits its ticket.
//! - No retries.

pub mod record_coordinator;
