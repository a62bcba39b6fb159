//! Record repository.

use crate::live::LiveView;
use crate::model::record::{Record, RecordId};
use crate::store::record_store::{RecordStore, StoreResult};

/// Forwards the five record operations to a `RecordStore`.
pub struct RecordRepository<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> RecordRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Live view of every stored record.
    pub fn all_items(&self) -> StoreResult<LiveView<Vec<Record>>> {
        self.store.list_all()
    }

    /// Live view of one record by id.
    pub fn get(&self, id: RecordId) -> StoreResult<LiveView<Option<Record>>> {
        self.store.get_by_id(id)
    }

    pub fn insert(&self, item: &Record) -> StoreResult<RecordId> {
        self.store.insert(item)
    }

    pub fn update(&self, item: &Record) -> StoreResult<usize> {
        self.store.update(std::slice::from_ref(item))
    }

    pub fn delete(&self, item: &Record) -> StoreResult<usize> {
        self.store.delete(std::slice::from_ref(item))
    }
}
