//! Subscriber-side live view handles.

use super::registry::{LiveRegistry, SubscriptionId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// The view's subscription was released; no further snapshots will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveViewClosed;

impl Display for LiveViewClosed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "live view subscription was released")
    }
}

impl Error for LiveViewClosed {}

/// Registration guard shared by all clones of one view.
pub(crate) struct Subscription {
    id: SubscriptionId,
    registry: Weak<LiveRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: &Arc<LiveRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    fn release(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Read handle that receives a fresh snapshot after every relevant write.
///
/// Clones share one subscription. It is released by `unsubscribe()` or when
/// the last clone is dropped.
pub struct LiveView<T> {
    receiver: watch::Receiver<T>,
    subscription: Arc<Subscription>,
}

impl<T> Clone for LiveView<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            subscription: Arc::clone(&self.subscription),
        }
    }
}

impl<T: Clone> LiveView<T> {
    pub(crate) fn new(receiver: watch::Receiver<T>, subscription: Subscription) -> Self {
        Self {
            receiver,
            subscription: Arc::new(subscription),
        }
    }

    /// Latest delivered snapshot.
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Whether a snapshot arrived that this handle has not consumed yet.
    pub fn has_changed(&self) -> Result<bool, LiveViewClosed> {
        self.receiver.has_changed().map_err(|_| LiveViewClosed)
    }

    /// Waits for the next snapshot and returns it.
    pub async fn changed(&mut self) -> Result<T, LiveViewClosed> {
        self.receiver.changed().await.map_err(|_| LiveViewClosed)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Waits until a snapshot satisfies `predicate`, checking the current one first.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&T) -> bool,
    ) -> Result<T, LiveViewClosed> {
        let value = self
            .receiver
            .wait_for(predicate)
            .await
            .map_err(|_| LiveViewClosed)?;
        Ok(T::clone(&value))
    }

    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription.id
    }

    /// Releases the subscription for every clone of this view.
    pub fn unsubscribe(&self) {
        self.subscription.release();
    }

    /// Whether storage still delivers snapshots to this view.
    pub fn is_active(&self) -> bool {
        self.receiver.has_changed().is_ok()
    }
}
