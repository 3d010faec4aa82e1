//! Port for the shared key-value tree backing every repository.
//!
//! The store is tree shaped and per-path: values are JSON, paths are
//! `/`-separated segments, and there are no cross-path transactions. The
//! conditional primitives [`TreeStore::set_if_absent`] and
//! [`TreeStore::compare_and_set`] are what repositories use to enforce
//! uniqueness rules.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::warn;

use super::define_port_error;

define_port_error! {
    /// Errors raised by tree store adapters.
    pub enum TreeStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "tree store connection failed: {message}",
        /// Read or write failed during execution.
        Query { message: String } => "tree store query failed: {message}",
        /// A stored value did not have the expected shape.
        Serialization { message: String } => "tree store serialization failed: {message}",
        /// A path string could not be parsed.
        InvalidPath { path: String } => "invalid store path: {path:?}",
    }
}

/// Location of a node in the tree.
///
/// # Examples
/// ```
/// use pawmate::domain::ports::StorePath;
///
/// let path = StorePath::parse("users/abc").expect("valid path");
/// assert_eq!(path.child("profile").to_string(), "users/abc/profile");
/// assert_eq!(path.parent().map(|p| p.to_string()), Some("users".to_owned()));
/// assert!(StorePath::parse("users//abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated path. Empty segments are rejected; a leading or
    /// trailing slash is tolerated.
    pub fn parse(raw: &str) -> Result<Self, TreeStoreError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(TreeStoreError::invalid_path(raw))
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Build a path from already-separated segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Extend the path by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The enclosing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self {
            segments: head.to_vec(),
        })
    }

    /// Final segment, or `None` at the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// All segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &StorePath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// A committed write observed by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    /// Path that was written.
    pub path: StorePath,
    /// New value, or `None` when the node was removed.
    pub value: Option<Value>,
}

impl StoreChange {
    /// True when the change touches `watched`: the written path lies at or
    /// beneath it, or the write replaced one of its ancestors.
    pub fn affects(&self, watched: &StorePath) -> bool {
        self.path.starts_with(watched) || watched.starts_with(&self.path)
    }
}

/// Change stream for one watched path.
///
/// Delivery is best effort: a subscriber that falls too far behind skips the
/// missed changes and keeps receiving newer ones.
pub struct StoreSubscription {
    watched: StorePath,
    receiver: broadcast::Receiver<StoreChange>,
}

impl StoreSubscription {
    /// Wrap a broadcast receiver, filtering to changes affecting `watched`.
    pub fn new(watched: StorePath, receiver: broadcast::Receiver<StoreChange>) -> Self {
        Self { watched, receiver }
    }

    /// Path this subscription watches.
    pub fn watched(&self) -> &StorePath {
        &self.watched
    }

    /// Wait for the next relevant change. Returns `None` once the store is
    /// dropped.
    pub async fn next(&mut self) -> Option<StoreChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.affects(&self.watched) => return Some(change),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(path = %self.watched, skipped, "store subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl fmt::Debug for StoreSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSubscription")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

/// Port for the shared JSON tree.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Read the value at `path`, including its whole subtree.
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, TreeStoreError>;

    /// Replace the value at `path`. Writing `null` removes the node.
    async fn set(&self, path: &StorePath, value: Value) -> Result<(), TreeStoreError>;

    /// Shallow-merge `partial` into the object at `path`, creating it when
    /// absent. `null` members remove the matching child.
    async fn update(
        &self,
        path: &StorePath,
        partial: Map<String, Value>,
    ) -> Result<(), TreeStoreError>;

    /// Allocate a fresh, time-ordered child key under `prefix`. Nothing is
    /// written.
    async fn push(&self, prefix: &StorePath) -> Result<String, TreeStoreError>;

    /// Delete the node at `path`. Removing an absent node is not an error.
    async fn remove(&self, path: &StorePath) -> Result<(), TreeStoreError>;

    /// Write `value` only when `path` is empty. Returns whether the write
    /// happened.
    async fn set_if_absent(&self, path: &StorePath, value: Value) -> Result<bool, TreeStoreError>;

    /// Replace the value at `path` with `value` only while it still equals
    /// `expected`. Writing `null` removes the node. Returns whether the write
    /// happened.
    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: &Value,
        value: Value,
    ) -> Result<bool, TreeStoreError>;

    /// Direct children of `path` as `(key, value)` pairs in key order.
    async fn children(&self, path: &StorePath) -> Result<Vec<(String, Value)>, TreeStoreError>;

    /// Watch `path` for committed writes.
    fn subscribe(&self, path: &StorePath) -> StoreSubscription;
}
