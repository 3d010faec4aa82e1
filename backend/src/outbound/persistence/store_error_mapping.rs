//! Shared tree store error mapping and JSON decoding for repositories.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{StorePath, TreeStoreError};

/// Map store errors into a repository's query/connection constructors.
///
/// Connection failures stay connection failures; everything else becomes a
/// query failure carrying the store's message.
pub fn map_basic_store_error<E, Q, C>(error: TreeStoreError, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    debug!(%error, "tree store operation failed");
    match error {
        TreeStoreError::Connection { message } => connection(message),
        other @ (TreeStoreError::Query { .. }
        | TreeStoreError::Serialization { .. }
        | TreeStoreError::InvalidPath { .. }) => query(other.to_string()),
    }
}

/// Decode a stored value, naming the path in the error.
pub fn decode<T: DeserializeOwned>(path: &StorePath, value: Value) -> Result<T, TreeStoreError> {
    serde_json::from_value(value)
        .map_err(|err| TreeStoreError::serialization(format!("record at {path}: {err}")))
}

/// Encode a record for storage.
pub fn encode<T: Serialize>(path: &StorePath, record: &T) -> Result<Value, TreeStoreError> {
    serde_json::to_value(record)
        .map_err(|err| TreeStoreError::serialization(format!("record for {path}: {err}")))
}
