use serde_json::Value;
use tokio::sync::watch;

use super::error::MetadataError;

/// A live view of one subtree of the metadata store.
///
/// The subscription always holds the latest delivered snapshot; [`changed`]
/// waits for the next one. Dropping the subscription, or calling
/// [`unsubscribe`], releases the watcher in the store. The last snapshot
/// stays readable after release.
///
/// [`changed`]: SubtreeSubscription::changed
/// [`unsubscribe`]: SubtreeSubscription::unsubscribe
pub struct SubtreeSubscription {
    rx: watch::Receiver<Value>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubtreeSubscription {
    /// Build a subscription from a watch receiver seeded with the current
    /// snapshot and a callback that detaches the watcher from the store.
    pub fn new(rx: watch::Receiver<Value>, release: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            rx,
            release: Some(release),
        }
    }

    /// The most recently delivered snapshot.
    pub fn snapshot(&self) -> Value {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot and return it.
    ///
    /// Intermediate snapshots may be skipped while the caller is not
    /// waiting; the returned value is always the latest. Returns
    /// [`MetadataError::SubscriptionClosed`] once the store drops its end.
    pub async fn changed(&mut self) -> Result<Value, MetadataError> {
        self.rx
            .changed()
            .await
            .map_err(|_| MetadataError::SubscriptionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Detach from the store. No further snapshots will be delivered.
    /// Calling this more than once has no effect.
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for SubtreeSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
