//! Record coordinator and write tickets.

use crate::live::LiveView;
use crate::logging::panic_payload_text;
use crate::model::record::{Record, RecordId};
use crate::repo::record_repo::RecordRepository;
use crate::store::record_store::{RecordStore, StoreError, StoreResult};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};

/// Outcome of awaiting a dispatched write.
#[derive(Debug)]
pub enum DispatchError {
    /// The repository call ran and failed; carried unchanged.
    Store(StoreError),
    /// The task was cancelled before completing (runtime shutdown).
    Cancelled,
    /// The repository call panicked.
    Panicked(String),
    /// No tokio runtime was available to dispatch on.
    NoRuntime(String),
}

impl DispatchError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_conflict())
    }

    fn from_join(err: JoinError) -> Self {
        if err.is_cancelled() {
            return Self::Cancelled;
        }
        let message = match err.try_into_panic() {
            Ok(payload) => panic_payload_text(payload.as_ref()).to_string(),
            Err(_) => "unknown join failure".to_string(),
        };
        Self::Panicked(message)
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "dispatched write was cancelled"),
            Self::Panicked(message) => write!(f, "dispatched write panicked: {message}"),
            Self::NoRuntime(message) => {
                write!(f, "record coordinator needs a tokio runtime: {message}")
            }
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Cancelled | Self::Panicked(_) | Self::NoRuntime(_) => None,
        }
    }
}

impl From<StoreError> for DispatchError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Handle to a dispatched write.
///
/// Dropping the ticket does not cancel the write; its effect still shows up
/// through live views. Awaiting it yields the repository result.
#[must_use = "drop the ticket explicitly to fire and forget"]
pub struct WriteTicket<T> {
    handle: JoinHandle<StoreResult<T>>,
}

impl<T> WriteTicket<T> {
    /// Waits for the write and returns its result.
    pub async fn wait(self) -> Result<T, DispatchError> {
        self.await
    }

    /// Whether the write has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for WriteTicket<T> {
    type Output = Result<T, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result.map_err(DispatchError::Store),
            Err(err) => Err(DispatchError::from_join(err)),
        })
    }
}

/// Bridges non-blocking repository writes to the front-end.
pub struct RecordCoordinator<S: RecordStore + 'static> {
    repository: Arc<RecordRepository<S>>,
    all_items: LiveView<Vec<Record>>,
    runtime: Handle,
}

impl<S: RecordStore + 'static> RecordCoordinator<S> {
    /// Creates a coordinator that dispatches writes on `runtime`.
    ///
    /// Subscribes to the full record list once; that view is kept for the
    /// coordinator's lifetime.
    pub fn new(repository: RecordRepository<S>, runtime: Handle) -> StoreResult<Self> {
        let all_items = repository.all_items()?;
        debug!(
            "event=coordinator_init module=coordinator status=ok subscription_id={}",
            all_items.subscription_id()
        );
        Ok(Self {
            repository: Arc::new(repository),
            all_items,
            runtime,
        })
    }

    /// Creates a coordinator bound to the runtime of the calling task.
    ///
    /// Outside a tokio runtime this returns `DispatchError::NoRuntime`.
    pub fn with_current_runtime(repository: RecordRepository<S>) -> Result<Self, DispatchError> {
        let runtime =
            Handle::try_current().map_err(|err| DispatchError::NoRuntime(err.to_string()))?;
        Ok(Self::new(repository, runtime)?)
    }

    /// The list live view established at construction.
    pub fn all_items(&self) -> LiveView<Vec<Record>> {
        self.all_items.clone()
    }

    /// Live view of one record.
    pub fn get(&self, id: RecordId) -> StoreResult<LiveView<Option<Record>>> {
        self.repository.get(id)
    }

    pub fn insert(&self, item: Record) -> WriteTicket<RecordId> {
        self.dispatch("insert", move |repository| repository.insert(&item))
    }

    pub fn update(&self, item: Record) -> WriteTicket<usize> {
        self.dispatch("update", move |repository| repository.update(&item))
    }

    pub fn delete(&self, item: Record) -> WriteTicket<usize> {
        self.dispatch("delete", move |repository| repository.delete(&item))
    }

    fn dispatch<T, F>(&self, operation: &'static str, write: F) -> WriteTicket<T>
    where
        T: Send + 'static,
        F: FnOnce(&RecordRepository<S>) -> StoreResult<T> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let handle = self.runtime.spawn_blocking(move || {
            let result = write(repository.as_ref());
            if let Err(err) = &result {
                warn!(
                    "event=record_{} module=coordinator status=error error={}",
                    operation, err
                );
            }
            result
        });
        WriteTicket { handle }
    }
}
