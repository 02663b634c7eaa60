use async_trait::async_trait;
use serde_json::{Map, Value};

use super::error::MetadataError;
use super::subscription::SubtreeSubscription;
use super::tree::TreePath;

/// Hierarchical JSON metadata store with live subtree subscriptions.
///
/// The store holds one JSON tree. Interior nodes are objects keyed by path
/// segment. A node either exists with a value or does not exist at all;
/// `Null` is not a storable value but the way absence is spelled, so writing
/// `Null` deletes and reading an absent node yields `None`. Parents that end
/// up with no children are pruned.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Read the subtree at `path`. Absent nodes read as `None`.
    async fn get(&self, path: &TreePath) -> Result<Option<Value>, MetadataError>;

    /// Replace the subtree at `path` with `value`, creating intermediate
    /// nodes as needed. Writing `Value::Null` removes the node.
    async fn put(&self, path: &TreePath, value: Value) -> Result<(), MetadataError>;

    /// Shallow-merge `patch` into the object at `path`.
    ///
    /// Each entry overwrites the field of the same name; a `Null` entry
    /// removes the field. Fields not named in the patch are untouched.
    /// Merging into an absent node creates it.
    async fn merge(&self, path: &TreePath, patch: Map<String, Value>) -> Result<(), MetadataError>;

    /// Remove the subtree at `path`. Removing an absent node is a no-op.
    async fn delete(&self, path: &TreePath) -> Result<(), MetadataError>;

    /// Watch the subtree at `path`.
    ///
    /// The subscription starts out holding the current snapshot and receives
    /// a full snapshot of the subtree after every change that affects it.
    /// Writes that leave the subtree identical are not delivered.
    async fn subscribe(&self, path: &TreePath) -> Result<SubtreeSubscription, MetadataError>;
}
