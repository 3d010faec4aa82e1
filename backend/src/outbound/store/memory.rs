//! In-process `TreeStore` implementation over a single JSON document.
//!
//! The whole tree lives in one `serde_json::Value` behind a `std::sync::Mutex`.
//! Every operation takes the lock, does its work synchronously and releases
//! it before returning, so no guard is ever held across an await point.
//! Committed writes are published on a `tokio::sync::broadcast` channel.
//!
//! Nothing is written to disk; this backend serves tests and throwaway dev
//! runs. See [`super::SqliteTreeStore`] for the durable one.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::ports::{StoreChange, StorePath, StoreSubscription, TreeStore, TreeStoreError};

use super::tree::{is_empty_node, node, normalise, write};

/// Buffered changes per subscriber before it starts lagging.
const CHANGE_BUFFER: usize = 256;

#[cfg(any(test, feature = "test-support"))]
struct Fault {
    prefix: StorePath,
    error: TreeStoreError,
}

/// Mutex-guarded JSON tree.
pub struct MemoryTreeStore {
    root: Mutex<Value>,
    #[cfg(any(test, feature = "test-support"))]
    faults: Mutex<Vec<Fault>>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for MemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTreeStore")
            .field("subscribers", &self.changes.receiver_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MemoryTreeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Create a store holding `tree`. Nulls and empty objects are dropped.
    pub fn from_value(tree: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        let root = match normalise(tree) {
            Value::Object(map) => Value::Object(map),
            _ => Value::Object(Map::new()),
        };
        Self {
            root: Mutex::new(root),
            #[cfg(any(test, feature = "test-support"))]
            faults: Mutex::new(Vec::new()),
            changes,
        }
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        lock(&self.root).clone()
    }

    /// Make every operation touching `prefix` (or beneath it) fail with
    /// `error` until [`MemoryTreeStore::clear_faults`] is called.
    #[cfg(any(test, feature = "test-support"))]
    pub fn inject_fault(&self, prefix: StorePath, error: TreeStoreError) {
        lock(&self.faults).push(Fault { prefix, error });
    }

    /// Remove every injected fault.
    #[cfg(any(test, feature = "test-support"))]
    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check(&self, path: &StorePath) -> Result<(), TreeStoreError> {
        let faults = lock(&self.faults);
        match faults.iter().find(|fault| path.starts_with(&fault.prefix)) {
            Some(fault) => Err(fault.error.clone()),
            None => Ok(()),
        }
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check(&self, _path: &StorePath) -> Result<(), TreeStoreError> {
        Ok(())
    }

    fn publish(&self, path: &StorePath, value: Option<Value>) {
        // No receivers is the common case and not an error.
        let _ = self.changes.send(StoreChange {
            path: path.clone(),
            value,
        });
    }

    fn commit(&self, path: &StorePath, value: Value) {
        let stored = {
            let mut root = lock(&self.root);
            write(&mut root, path.segments(), normalise(value));
            node(&root, path.segments()).cloned()
        };
        trace!(%path, removed = stored.is_none(), "tree write committed");
        self.publish(path, stored);
    }
}

#[async_trait]
impl TreeStore for MemoryTreeStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, TreeStoreError> {
        self.check(path)?;
        let root = lock(&self.root);
        Ok(node(&root, path.segments()).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), TreeStoreError> {
        self.check(path)?;
        if path.is_root() && !value.is_object() && !value.is_null() {
            return Err(TreeStoreError::invalid_path(path.to_string()));
        }
        self.commit(path, value);
        Ok(())
    }

    async fn update(
        &self,
        path: &StorePath,
        partial: Map<String, Value>,
    ) -> Result<(), TreeStoreError> {
        self.check(path)?;
        let stored = {
            let mut root = lock(&self.root);
            for (key, value) in partial {
                write(&mut root, path.child(key).segments(), normalise(value));
            }
            node(&root, path.segments()).cloned()
        };
        self.publish(path, stored);
        Ok(())
    }

    async fn push(&self, prefix: &StorePath) -> Result<String, TreeStoreError> {
        self.check(prefix)?;
        let key = Uuid::now_v7().to_string();
        debug!(%prefix, %key, "allocated child key");
        Ok(key)
    }

    async fn remove(&self, path: &StorePath) -> Result<(), TreeStoreError> {
        self.check(path)?;
        self.commit(path, Value::Null);
        Ok(())
    }

    async fn set_if_absent(&self, path: &StorePath, value: Value) -> Result<bool, TreeStoreError> {
        self.check(path)?;
        let value = normalise(value);
        if is_empty_node(&value) {
            return Err(TreeStoreError::serialization(format!(
                "conditional write at {path} has no content"
            )));
        }
        {
            let mut root = lock(&self.root);
            if node(&root, path.segments()).is_some() {
                return Ok(false);
            }
            write(&mut root, path.segments(), value.clone());
        }
        self.publish(path, Some(value));
        Ok(true)
    }

    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: &Value,
        value: Value,
    ) -> Result<bool, TreeStoreError> {
        self.check(path)?;
        let value = normalise(value);
        let stored = {
            let mut root = lock(&self.root);
            let current = node(&root, path.segments()).unwrap_or(&Value::Null);
            if current != &normalise(expected.clone()) {
                return Ok(false);
            }
            write(&mut root, path.segments(), value);
            node(&root, path.segments()).cloned()
        };
        self.publish(path, stored);
        Ok(true)
    }

    async fn children(&self, path: &StorePath) -> Result<Vec<(String, Value)>, TreeStoreError> {
        self.check(path)?;
        let root = lock(&self.root);
        let Some(Value::Object(map)) = node(&root, path.segments()) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<_> = map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }

    fn subscribe(&self, path: &StorePath) -> StoreSubscription {
        StoreSubscription::new(path.clone(), self.changes.subscribe())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
