use common::metadata::{MetadataError, MetadataStore, TreePath};
use serde_json::Value;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::warn;

use crate::category::Category;
use crate::error::CatalogError;

/// A live, ordered view of every category under one namespace.
///
/// The projection subscribes to the namespace subtree and keeps a decoded
/// list current. Readers either poll [`current`], await [`changed`], or
/// consume the projection as a stream. The view always reflects a complete
/// store snapshot; bursts of writes may coalesce into one delivery.
///
/// [`current`]: CategoryListProjection::current
/// [`changed`]: CategoryListProjection::changed
pub struct CategoryListProjection {
    rx: watch::Receiver<Vec<Category>>,
}

impl CategoryListProjection {
    /// Subscribe to `namespace` and start decoding snapshots.
    pub async fn attach(
        store: &dyn MetadataStore,
        namespace: &TreePath,
    ) -> Result<Self, CatalogError> {
        let mut subscription = store.subscribe(namespace).await?;
        let (tx, rx) = watch::channel(decode_snapshot(&subscription.snapshot()));

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    changed = subscription.changed() => match changed {
                        Ok(snapshot) => {
                            let next = decode_snapshot(&snapshot);
                            tx.send_if_modified(|current| {
                                if *current == next {
                                    false
                                } else {
                                    *current = next;
                                    true
                                }
                            });
                        }
                        Err(_) => {
                            warn!("Category subscription closed, live view stops updating");
                            break;
                        }
                    },
                }
            }
        });

        Ok(Self { rx })
    }

    /// The most recently delivered list.
    pub fn current(&self) -> Vec<Category> {
        self.rx.borrow().clone()
    }

    /// Wait for the next list and return it. Intermediate lists may be
    /// skipped while the caller is not waiting.
    pub async fn changed(&mut self) -> Result<Vec<Category>, CatalogError> {
        self.rx
            .changed()
            .await
            .map_err(|_| CatalogError::Persistence(MetadataError::SubscriptionClosed))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Consume the projection as a stream. The stream yields the current
    /// list first, then every subsequent one.
    pub fn into_stream(self) -> WatchStream<Vec<Category>> {
        WatchStream::new(self.rx)
    }

    /// Stop the view and release the store-side subscription. Dropping the
    /// projection does the same.
    pub fn unsubscribe(self) {}
}

/// Decode a namespace snapshot into an ordered category list.
///
/// An absent subtree decodes to an empty list. Records that no longer parse
/// are skipped, not fatal; the id stored inside the record wins over the
/// node key it sits under.
pub(crate) fn decode_snapshot(snapshot: &Value) -> Vec<Category> {
    let Value::Object(records) = snapshot else {
        return Vec::new();
    };

    let mut categories: Vec<Category> = records
        .iter()
        .filter_map(|(key, record)| match serde_json::from_value(record.clone()) {
            Ok(category) => Some(category),
            Err(error) => {
                warn!(key, error = %error, "Skipping malformed category record");
                None
            }
        })
        .collect();

    // Ids are mint timestamps; numeric order is creation order.
    categories.sort_by(|a, b| {
        let (a, b) = (a.id.as_str(), b.id.as_str());
        match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.cmp(b),
        }
    });
    categories
}
