use datarecord_core::{
    DispatchError, Record, RecordCoordinator, RecordRepository, SqliteRecordStore, StoreError,
};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn coordinator() -> RecordCoordinator<Arc<SqliteRecordStore>> {
    let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
    RecordCoordinator::with_current_runtime(RecordRepository::new(store)).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn crud_scenarios_flow_through_live_views() {
    let coordinator = coordinator();
    let mut all_items = coordinator.all_items();
    assert!(all_items.current().is_empty());

    // insert {auto, "hello"}
    let id = coordinator
        .insert(Record::unsaved("hello"))
        .wait()
        .await
        .unwrap();
    let rows = tokio::time::timeout(WAIT, all_items.wait_for(|rows| rows.len() == 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rows, vec![Record::new(id, "hello")]);

    // update {N, "world"}
    let mut detail = coordinator.get(id).unwrap();
    let _ = coordinator.update(Record::new(id, "world"));
    let updated = tokio::time::timeout(
        WAIT,
        detail.wait_for(|row| row.as_ref().is_some_and(|row| row.text == "world")),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated, Some(Record::new(id, "world")));
    let rows = tokio::time::timeout(
        WAIT,
        all_items.wait_for(|rows| rows.iter().all(|row| row.text == "world")),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(rows.len(), 1);

    // insert {N, "dup"}
    let err = coordinator
        .insert(Record::new(id, "dup"))
        .wait()
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(
        err,
        DispatchError::Store(StoreError::Conflict(conflict)) if conflict == id
    ));
    assert_eq!(all_items.current(), vec![Record::new(id, "world")]);

    // delete {N}
    let _ = coordinator.delete(Record::new(id, "ignored"));
    let rows = tokio::time::timeout(WAIT, all_items.wait_for(|rows| rows.is_empty()))
        .await
        .unwrap()
        .unwrap();
    assert!(rows.is_empty());
    let gone = tokio::time::timeout(WAIT, detail.wait_for(|row| row.is_none()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(gone, None);
}

#[tokio::test]
async fn dropped_ticket_still_applies_write() {
    let coordinator = coordinator();
    let mut all_items = coordinator.all_items();

    drop(coordinator.insert(Record::unsaved("fire and forget")));

    let rows = tokio::time::timeout(WAIT, all_items.wait_for(|rows| !rows.is_empty()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rows[0].text, "fire and forget");
}

#[tokio::test]
async fn update_and_delete_of_missing_id_resolve_without_error() {
    let coordinator = coordinator();

    let updated = coordinator
        .update(Record::new(404, "nobody"))
        .wait()
        .await
        .unwrap();
    let deleted = coordinator
        .delete(Record::new(404, "nobody"))
        .wait()
        .await
        .unwrap();

    assert_eq!(updated, 0);
    assert_eq!(deleted, 0);
    assert!(coordinator.all_items().current().is_empty());
}

#[tokio::test]
async fn all_items_handle_is_shared_for_coordinator_lifetime() {
    let coordinator = coordinator();

    let first = coordinator.all_items();
    let second = coordinator.all_items();

    assert_eq!(first.subscription_id(), second.subscription_id());
}

#[test]
fn coordinator_can_dispatch_on_explicit_runtime_handle() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .unwrap();
    let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
    let coordinator =
        RecordCoordinator::new(RecordRepository::new(store), runtime.handle().clone()).unwrap();

    let ticket = coordinator.insert(Record::unsaved("from sync caller"));
    let id = runtime.block_on(ticket).unwrap();

    assert_eq!(
        coordinator.get(id).unwrap().current(),
        Some(Record::new(id, "from sync caller"))
    );
}

#[test]
fn current_runtime_constructor_reports_missing_runtime() {
    let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());

    let result = RecordCoordinator::with_current_runtime(RecordRepository::new(store));

    let Err(err) = result else {
        panic!("coordinator should not build outside a runtime");
    };
    assert!(matches!(err, DispatchError::NoRuntime(_)));
    assert!(err.to_string().contains("tokio runtime"));
}
