//! Core data access for DataRecord.
//! This crate owns the record table, its live views and the write path used
//! by every front-end.

pub mod config;
pub mod coordinator;
pub mod database;
pub mod db;
pub mod live;
mod lock;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::CoreConfig;
pub use coordinator::record_coordinator::{DispatchError, RecordCoordinator, WriteTicket};
pub use database::AppDatabase;
pub use live::{LiveQuery, LiveRegistry, LiveView, LiveViewClosed, SubscriptionId};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
    LoggingError,
};
pub use model::record::{
    validate_record_text, Record, RecordId, RecordValidationError, NEW_RECORD_ID,
};
pub use repo::record_repo::RecordRepository;
pub use store::record_store::{RecordStore, SqliteRecordStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
