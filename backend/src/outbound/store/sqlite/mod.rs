//! Durable `TreeStore` over one SQLite file through Diesel.
//!
//! Each non-object value in the tree is one `tree_nodes` row keyed by its
//! path. Segments are escaped so `/` only ever separates them, which makes
//! a subtree the contiguous key range `[key + "/", key + "0")` plus `key`
//! itself. Every write runs in an immediate transaction, so conditional
//! writes stay atomic across processes sharing the file.
//!
//! Change notifications only reach subscribers in the writing process.

mod pool;
mod schema;

use std::path::Path;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::{Sqlite, SqliteConnection};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::ports::{StoreChange, StorePath, StoreSubscription, TreeStore, TreeStoreError};

use super::tree::{is_empty_node, leaves, normalise, write};
use pool::{DbPool, PoolError};
use schema::tree_nodes;

const CHANGE_BUFFER: usize = 256;
const POOL_SIZE: u32 = 8;

impl From<DieselError> for TreeStoreError {
    fn from(error: DieselError) -> Self {
        debug!(%error, "sqlite operation failed");
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                Self::connection(info.message().to_owned())
            }
            other => Self::query(other.to_string()),
        }
    }
}

impl From<PoolError> for TreeStoreError {
    fn from(error: PoolError) -> Self {
        Self::connection(error.to_string())
    }
}

fn escape(segment: &str) -> String {
    segment.replace('%', "%25").replace('/', "%2F")
}

fn unescape(segment: &str) -> String {
    segment.replace("%2F", "/").replace("%25", "%")
}

fn key_of(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| escape(segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Rows at `key` or beneath it, in key order.
fn subtree_rows(conn: &mut SqliteConnection, key: &str) -> QueryResult<Vec<(String, String)>> {
    let query = tree_nodes::table
        .select((tree_nodes::path, tree_nodes::value))
        .order(tree_nodes::path.asc())
        .into_boxed::<Sqlite>();
    let query = if key.is_empty() {
        query
    } else {
        query.filter(
            tree_nodes::path.eq(key.to_owned()).or(tree_nodes::path
                .ge(format!("{key}/"))
                .and(tree_nodes::path.lt(format!("{key}0")))),
        )
    };
    query.load(conn)
}

fn load(conn: &mut SqliteConnection, path: &StorePath) -> Result<Option<Value>, TreeStoreError> {
    let key = key_of(path.segments());
    let mut root = Value::Null;
    for (row_key, raw) in subtree_rows(conn, &key)? {
        let leaf: Value = serde_json::from_str(&raw).map_err(|err| {
            TreeStoreError::serialization(format!("row {row_key} is not JSON: {err}"))
        })?;
        let relative: Vec<String> = row_key
            .strip_prefix(key.as_str())
            .unwrap_or(row_key.as_str())
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(unescape)
            .collect();
        write(&mut root, &relative, leaf);
    }
    Ok((!is_empty_node(&root)).then_some(root))
}

/// Replace whatever sits at `path` with `value`. Scalars stored at an
/// ancestor are dropped, since the ancestor now holds an object.
fn replace(
    conn: &mut SqliteConnection,
    path: &StorePath,
    value: &Value,
) -> Result<(), TreeStoreError> {
    let key = key_of(path.segments());
    if key.is_empty() {
        diesel::delete(tree_nodes::table).execute(conn)?;
    } else {
        diesel::delete(
            tree_nodes::table.filter(
                tree_nodes::path.eq(key.as_str()).or(tree_nodes::path
                    .ge(format!("{key}/"))
                    .and(tree_nodes::path.lt(format!("{key}0")))),
            ),
        )
        .execute(conn)?;
    }

    let leaves = leaves(value);
    if leaves.is_empty() {
        return Ok(());
    }
    let ancestors: Vec<String> = (1..path.segments().len())
        .map(|depth| key_of(&path.segments()[..depth]))
        .collect();
    if !ancestors.is_empty() {
        diesel::delete(tree_nodes::table.filter(tree_nodes::path.eq_any(ancestors)))
            .execute(conn)?;
    }
    for (relative, leaf) in leaves {
        let row_key = match (key.is_empty(), relative.is_empty()) {
            (_, true) => key.clone(),
            (true, false) => key_of(&relative),
            (false, false) => format!("{key}/{}", key_of(&relative)),
        };
        let raw = serde_json::to_string(leaf)
            .map_err(|err| TreeStoreError::serialization(err.to_string()))?;
        diesel::insert_into(tree_nodes::table)
            .values((tree_nodes::path.eq(row_key), tree_nodes::value.eq(raw)))
            .execute(conn)?;
    }
    Ok(())
}

/// `TreeStore` persisted in a SQLite database file.
#[derive(Clone)]
pub struct SqliteTreeStore {
    pool: DbPool,
    changes: broadcast::Sender<StoreChange>,
}

impl std::fmt::Debug for SqliteTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTreeStore")
            .field("subscribers", &self.changes.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SqliteTreeStore {
    /// Open the database at `path`, creating and migrating it when needed.
    ///
    /// Blocks while connecting; call it during startup.
    ///
    /// # Errors
    ///
    /// Returns a connection error when the file cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, TreeStoreError> {
        let pool = DbPool::open(path, POOL_SIZE)?;
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Ok(Self { pool, changes })
    }

    /// Write `tree` as the whole store when the store holds nothing yet.
    /// Returns whether the tree was written. Blocks; call it during startup.
    pub fn import_if_empty(&self, tree: &Value) -> Result<bool, TreeStoreError> {
        let tree = normalise(tree.clone());
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| {
            let occupied: bool =
                diesel::select(diesel::dsl::exists(tree_nodes::table.select(tree_nodes::path))).get_result(conn)?;
            if occupied {
                return Ok(false);
            }
            replace(conn, &StorePath::root(), &tree)?;
            Ok(true)
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, TreeStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, TreeStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut *conn)
        })
        .await
        .map_err(|err| TreeStoreError::connection(format!("store worker stopped: {err}")))?
    }

    /// Apply `mutate` in an immediate transaction and publish the resulting
    /// value at `path` when it reports a write.
    async fn write_with<F>(&self, path: &StorePath, mutate: F) -> Result<bool, TreeStoreError>
    where
        F: FnOnce(&mut SqliteConnection, &StorePath) -> Result<bool, TreeStoreError>
            + Send
            + 'static,
    {
        let owned = path.clone();
        let (written, stored) = self
            .run(move |conn| {
                conn.immediate_transaction(|conn| {
                    if !mutate(conn, &owned)? {
                        return Ok((false, None));
                    }
                    Ok((true, load(conn, &owned)?))
                })
            })
            .await?;
        if written {
            trace!(%path, removed = stored.is_none(), "tree write committed");
            // No receivers is the common case and not an error.
            let _ = self.changes.send(StoreChange {
                path: path.clone(),
                value: stored,
            });
        }
        Ok(written)
    }
}

#[async_trait]
impl TreeStore for SqliteTreeStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, TreeStoreError> {
        let path = path.clone();
        self.run(move |conn| load(conn, &path)).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), TreeStoreError> {
        if path.is_root() && !value.is_object() && !value.is_null() {
            return Err(TreeStoreError::invalid_path(path.to_string()));
        }
        let value = normalise(value);
        self.write_with(path, move |conn, path| {
            replace(conn, path, &value)?;
            Ok(true)
        })
        .await
        .map(drop)
    }

    async fn update(
        &self,
        path: &StorePath,
        partial: Map<String, Value>,
    ) -> Result<(), TreeStoreError> {
        self.write_with(path, move |conn, path| {
            for (key, value) in partial {
                replace(conn, &path.child(key), &normalise(value))?;
            }
            Ok(true)
        })
        .await
        .map(drop)
    }

    async fn push(&self, prefix: &StorePath) -> Result<String, TreeStoreError> {
        let key = Uuid::now_v7().to_string();
        debug!(%prefix, %key, "allocated child key");
        Ok(key)
    }

    async fn remove(&self, path: &StorePath) -> Result<(), TreeStoreError> {
        self.write_with(path, |conn, path| {
            replace(conn, path, &Value::Null)?;
            Ok(true)
        })
        .await
        .map(drop)
    }

    async fn set_if_absent(&self, path: &StorePath, value: Value) -> Result<bool, TreeStoreError> {
        let value = normalise(value);
        if is_empty_node(&value) {
            return Err(TreeStoreError::serialization(format!(
                "conditional write at {path} has no content"
            )));
        }
        self.write_with(path, move |conn, path| {
            if load(conn, path)?.is_some() {
                return Ok(false);
            }
            replace(conn, path, &value)?;
            Ok(true)
        })
        .await
    }

    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: &Value,
        value: Value,
    ) -> Result<bool, TreeStoreError> {
        let expected = normalise(expected.clone());
        let value = normalise(value);
        self.write_with(path, move |conn, path| {
            let current = load(conn, path)?.unwrap_or(Value::Null);
            if current != expected {
                return Ok(false);
            }
            replace(conn, path, &value)?;
            Ok(true)
        })
        .await
    }

    async fn children(&self, path: &StorePath) -> Result<Vec<(String, Value)>, TreeStoreError> {
        let Some(Value::Object(map)) = self.get(path).await? else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<_> = map.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }

    fn subscribe(&self, path: &StorePath) -> StoreSubscription {
        StoreSubscription::new(path.clone(), self.changes.subscribe())
    }
}
