//! Mutex acquisition shared by the store and the live registry.

use log::warn;
use std::sync::{Mutex, MutexGuard};

/// Locks `mutex`, recovering the inner value if a previous holder panicked.
///
/// Both guarded values (the SQLite connection and the subscriber map) stay
/// consistent across a panic: SQLite rolls back the open transaction when
/// its guard unwinds, and map updates are single inserts/removes.
pub(crate) fn acquire_lock<'a, T>(mutex: &'a Mutex<T>, resource: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("event=lock_poison_recovered module=core status=warn resource={resource}");
            poisoned.into_inner()
        }
    }
}
