use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};

use super::error::MetadataError;
use super::subscription::SubtreeSubscription;
use super::traits::MetadataStore;
use super::tree::TreePath;

/// In-memory hierarchical metadata store.
///
/// The whole tree is one JSON value behind a mutex. Writers mutate the tree
/// and then push fresh snapshots to every watcher whose subtree actually
/// changed, so subscribers never observe a half-applied write.
pub struct MemoryMetadataStore {
    state: Arc<Mutex<State>>,
}

struct State {
    tree: Value,
    watchers: Vec<Watcher>,
    next_watcher_id: u64,
}

struct Watcher {
    id: u64,
    path: TreePath,
    tx: watch::Sender<Value>,
    alive: Arc<AtomicBool>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                tree: Value::Null,
                watchers: Vec::new(),
                next_watcher_id: 0,
            })),
        }
    }

    #[cfg(test)]
    async fn watcher_count(&self) -> usize {
        let mut state = self.state.lock().await;
        state
            .watchers
            .retain(|w| w.alive.load(Ordering::SeqCst) && !w.tx.is_closed());
        state.watchers.len()
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self, path: &TreePath) -> Result<Option<Value>, MetadataError> {
        let state = self.state.lock().await;
        Ok(subtree(&state.tree, path).cloned())
    }

    async fn put(&self, path: &TreePath, value: Value) -> Result<(), MetadataError> {
        let mut state = self.state.lock().await;
        write_node(&mut state.tree, path.segments(), value);
        notify(&mut state);
        Ok(())
    }

    async fn merge(&self, path: &TreePath, patch: Map<String, Value>) -> Result<(), MetadataError> {
        let mut state = self.state.lock().await;

        let mut fields = match subtree(&state.tree, path) {
            Some(Value::Object(map)) => map.clone(),
            // Merging into an absent or non-object node starts from scratch.
            _ => Map::new(),
        };
        for (key, value) in patch {
            if value.is_null() {
                fields.remove(&key);
            } else {
                fields.insert(key, value);
            }
        }

        write_node(&mut state.tree, path.segments(), Value::Object(fields));
        notify(&mut state);
        Ok(())
    }

    async fn delete(&self, path: &TreePath) -> Result<(), MetadataError> {
        self.put(path, Value::Null).await
    }

    async fn subscribe(&self, path: &TreePath) -> Result<SubtreeSubscription, MetadataError> {
        let mut state = self.state.lock().await;

        let snapshot = subtree(&state.tree, path).cloned().unwrap_or(Value::Null);
        let (tx, rx) = watch::channel(snapshot);

        let id = state.next_watcher_id;
        state.next_watcher_id += 1;
        let alive = Arc::new(AtomicBool::new(true));
        state.watchers.push(Watcher {
            id,
            path: path.clone(),
            tx,
            alive: alive.clone(),
        });

        let shared = Arc::clone(&self.state);
        let release = Box::new(move || {
            // The flag always lands; the eager removal is best effort and
            // the next notify pass sweeps whatever it could not take.
            alive.store(false, Ordering::SeqCst);
            if let Ok(mut state) = shared.try_lock() {
                state.watchers.retain(|w| w.id != id);
            }
        });

        Ok(SubtreeSubscription::new(rx, release))
    }
}

/// Walk down to the node at `path`, if it exists.
fn subtree<'a>(tree: &'a Value, path: &TreePath) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Replace the node at `segments` with `value`, creating intermediate
/// objects on the way down. Writing `Null` removes the node, and parents
/// left empty collapse on the way back up.
fn write_node(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        let mut value = value;
        normalize(&mut value);
        *node = value;
        return;
    };

    if !matches!(node, Value::Object(_)) {
        *node = Value::Object(Map::new());
    }

    let became_empty = if let Value::Object(map) = &mut *node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        write_node(child, rest, value);
        if map.get(head.as_str()).is_some_and(Value::is_null) {
            map.remove(head.as_str());
        }
        map.is_empty()
    } else {
        false
    };

    if became_empty {
        *node = Value::Null;
    }
}

/// Strip `Null` object fields at every depth; objects left empty become
/// `Null` so absence stays the only spelling of "no node".
fn normalize(value: &mut Value) {
    if let Value::Object(map) = value {
        map.retain(|_, child| {
            normalize(child);
            !child.is_null()
        });
        if map.is_empty() {
            *value = Value::Null;
        }
    }
}

/// Push the current snapshot of each watched subtree to its subscriber,
/// skipping watchers whose subtree is unchanged.
fn notify(state: &mut State) {
    let State { tree, watchers, .. } = state;
    watchers.retain(|w| w.alive.load(Ordering::SeqCst) && !w.tx.is_closed());
    for watcher in watchers.iter() {
        let snapshot = subtree(tree, &watcher.path).cloned().unwrap_or(Value::Null);
        watcher.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
