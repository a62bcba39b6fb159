//! Process-wide record database instance.
//!
//! # Responsibility
//! - Open the store file once per process, on first access.
//! - Hand out shared handles to the single store.
//!
//! # Invariants
//! - Concurrent first calls open the file exactly once.
//! - The instance is bound to one path for the process lifetime; there is
//!   no close path.

use crate::db::DbError;
use crate::repo::record_repo::RecordRepository;
use crate::store::record_store::{SqliteRecordStore, StoreResult};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static INSTANCE: OnceCell<AppDatabase> = OnceCell::new();

/// The single record database of this process.
pub struct AppDatabase {
    path: PathBuf,
    store: Arc<SqliteRecordStore>,
}

impl AppDatabase {
    /// Returns the process-wide database, opening `path` on first use.
    ///
    /// # Errors
    /// - Any open/bootstrap error on first use.
    /// - `DbError::AlreadyOpen` when the instance is bound to another path.
    pub fn get_database(path: impl AsRef<Path>) -> StoreResult<&'static AppDatabase> {
        let requested = path.as_ref().to_path_buf();
        let database = INSTANCE.get_or_try_init(|| -> StoreResult<AppDatabase> {
            let store = SqliteRecordStore::open(&requested)?;
            info!(
                "event=database_instance module=database status=ok path={}",
                requested.display()
            );
            Ok(AppDatabase {
                path: requested.clone(),
                store: Arc::new(store),
            })
        })?;

        if database.path != requested {
            return Err(DbError::AlreadyOpen {
                active: database.path.clone(),
                requested,
            }
            .into());
        }
        Ok(database)
    }

    /// Returns the instance if some caller already opened it.
    pub fn try_instance() -> Option<&'static AppDatabase> {
        INSTANCE.get()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the store.
    pub fn record_store(&self) -> Arc<SqliteRecordStore> {
        Arc::clone(&self.store)
    }

    /// Repository over the shared store.
    pub fn record_repository(&self) -> RecordRepository<Arc<SqliteRecordStore>> {
        RecordRepository::new(self.record_store())
    }
}
