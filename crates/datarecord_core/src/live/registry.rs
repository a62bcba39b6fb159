//! Observer registry keyed by subscription.

use super::view::{LiveView, Subscription};
use crate::lock::acquire_lock;
use crate::model::record::{Record, RecordId};
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Process-unique handle for one registered view.
pub type SubscriptionId = u64;

/// Query shape a subscription observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveQuery {
    All,
    ById(RecordId),
}

enum Publisher {
    All(watch::Sender<Vec<Record>>),
    ById(RecordId, watch::Sender<Option<Record>>),
}

impl Publisher {
    fn query(&self) -> LiveQuery {
        match self {
            Self::All(_) => LiveQuery::All,
            Self::ById(id, _) => LiveQuery::ById(*id),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    next_id: SubscriptionId,
    publishers: BTreeMap<SubscriptionId, Publisher>,
}

/// Set of active live-view subscriptions for one store.
#[derive(Default)]
pub struct LiveRegistry {
    state: Mutex<RegistryState>,
}

impl LiveRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a full-table view seeded with `initial`.
    ///
    /// Callers must hold the store's write lock while loading `initial` and
    /// registering, so no commit falls between the two.
    pub fn register_all(self: &Arc<Self>, initial: Vec<Record>) -> LiveView<Vec<Record>> {
        let (sender, receiver) = watch::channel(initial);
        let id = self.insert(Publisher::All(sender));
        LiveView::new(receiver, Subscription::new(id, self))
    }

    /// Registers a single-row view seeded with `initial`.
    pub fn register_by_id(
        self: &Arc<Self>,
        record_id: RecordId,
        initial: Option<Record>,
    ) -> LiveView<Option<Record>> {
        let (sender, receiver) = watch::channel(initial);
        let id = self.insert(Publisher::ById(record_id, sender));
        LiveView::new(receiver, Subscription::new(id, self))
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        acquire_lock(&self.state, "live_registry").publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Query shapes of all live subscriptions, in subscription order.
    pub fn queries(&self) -> Vec<LiveQuery> {
        acquire_lock(&self.state, "live_registry")
            .publishers
            .values()
            .map(Publisher::query)
            .collect()
    }

    /// Pushes fresh snapshots to every subscriber.
    ///
    /// The full table is loaded at most once per call and reused for by-id
    /// views. List views always receive the new snapshot; by-id views only
    /// when their row changed. Returns the number of views notified.
    pub(crate) fn publish<E>(
        &self,
        mut load_all: impl FnMut() -> Result<Vec<Record>, E>,
        mut load_one: impl FnMut(RecordId) -> Result<Option<Record>, E>,
    ) -> Result<usize, E> {
        let mut state = acquire_lock(&self.state, "live_registry");
        state.publishers.retain(|_, publisher| match publisher {
            Publisher::All(sender) => !sender.is_closed(),
            Publisher::ById(_, sender) => !sender.is_closed(),
        });
        if state.publishers.is_empty() {
            return Ok(0);
        }

        let needs_all = state
            .publishers
            .values()
            .any(|publisher| matches!(publisher, Publisher::All(_)));
        let all_rows = if needs_all { Some(load_all()?) } else { None };

        let mut notified = 0;
        for publisher in state.publishers.values() {
            match publisher {
                Publisher::All(sender) => {
                    if let Some(rows) = &all_rows {
                        sender.send_replace(rows.clone());
                        notified += 1;
                    }
                }
                Publisher::ById(record_id, sender) => {
                    let row = match &all_rows {
                        Some(rows) => rows.iter().find(|row| row.id == *record_id).cloned(),
                        None => load_one(*record_id)?,
                    };
                    let changed = sender.send_if_modified(|current| {
                        if *current == row {
                            return false;
                        }
                        *current = row;
                        true
                    });
                    if changed {
                        notified += 1;
                    }
                }
            }
        }

        Ok(notified)
    }

    fn insert(&self, publisher: Publisher) -> SubscriptionId {
        let mut state = acquire_lock(&self.state, "live_registry");
        state.next_id += 1;
        let id = state.next_id;
        debug!(
            "event=live_subscribe module=live status=ok subscription_id={} query={:?}",
            id,
            publisher.query()
        );
        state.publishers.insert(id, publisher);
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let removed = acquire_lock(&self.state, "live_registry")
            .publishers
            .remove(&id)
            .is_some();
        if removed {
            debug!("event=live_unsubscribe module=live status=ok subscription_id={id}");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::{LiveQuery, LiveRegistry};
    use crate::model::record::{Record, RecordId};
    use std::convert::Infallible;

    fn rows() -> Vec<Record> {
        vec![Record::new(1, "one"), Record::new(2, "two")]
    }

    fn never_one(_: RecordId) -> Result<Option<Record>, Infallible> {
        panic!("by-id loader must not run when the full table is loaded")
    }

    #[test]
    fn publish_reuses_full_snapshot_for_by_id_views() {
        let registry = LiveRegistry::new();
        let list = registry.register_all(Vec::new());
        let one = registry.register_by_id(2, None);

        let notified = registry
            .publish(|| Ok::<_, Infallible>(rows()), never_one)
            .unwrap();

        assert_eq!(notified, 2);
        assert_eq!(list.current().len(), 2);
        assert_eq!(one.current(), Some(Record::new(2, "two")));
    }

    #[test]
    fn by_id_view_is_not_renotified_when_row_is_unchanged() {
        let registry = LiveRegistry::new();
        let one = registry.register_by_id(1, Some(Record::new(1, "one")));

        let notified = registry
            .publish(
                || -> Result<Vec<Record>, Infallible> { panic!("no list subscriber") },
                |id| Ok(rows().into_iter().find(|row| row.id == id)),
            )
            .unwrap();

        assert_eq!(notified, 0);
        assert_eq!(one.has_changed(), Ok(false));
    }

    #[test]
    fn dropping_last_view_clone_releases_registration() {
        let registry = LiveRegistry::new();
        let view = registry.register_all(Vec::new());
        let clone = view.clone();
        assert_eq!(registry.queries(), vec![LiveQuery::All]);

        drop(view);
        assert_eq!(registry.len(), 1);
        drop(clone);
        assert!(registry.is_empty());
    }

    #[test]
    fn explicit_unsubscribe_removes_entry_for_all_clones() {
        let registry = LiveRegistry::new();
        let view = registry.register_by_id(9, None);
        let clone = view.clone();

        view.unsubscribe();

        assert!(registry.is_empty());
        assert!(!clone.is_active());
    }
}
