//! Opening the durable store at startup, seeding it from a JSON snapshot on
//! first boot.
//!
//! The snapshot uses the same layout the repositories write (`users/...`,
//! `pets/...`), so an export of a running store can be replayed verbatim. A
//! database that already holds data is never overwritten by the snapshot.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::domain::ports::TreeStoreError;
use crate::outbound::store::SqliteTreeStore;

/// Errors returned while loading a snapshot.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The snapshot is not valid JSON.
    #[error("snapshot at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The snapshot root must be an object keyed by top-level collection.
    #[error("snapshot at {path} must contain a JSON object at its root")]
    NotAnObject { path: PathBuf },
}

/// Errors returned while opening the store.
#[derive(Debug, Error)]
pub enum StoreOpenError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("failed to open store at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: TreeStoreError,
    },
}

fn read_error(path: &Path, source: std::io::Error) -> SeedError {
    SeedError::Read {
        path: path.to_path_buf(),
        source,
    }
}

fn read_snapshot(path: &Path) -> Result<Value, SeedError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "snapshot path must be a file",
            ),
        )
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|source| read_error(path, source))?;
    let payload = dir
        .read(Path::new(file_name))
        .map_err(|source| read_error(path, source))?;
    serde_json::from_slice(&payload).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a snapshot file, requiring an object at its root.
pub fn load_snapshot(path: &Path) -> Result<Value, SeedError> {
    let tree = read_snapshot(path)?;
    if !tree.is_object() {
        return Err(SeedError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(tree)
}

/// Open the database at `database_path`, importing `seed_path` when the
/// database is still empty.
pub fn open_store(
    database_path: &Path,
    seed_path: Option<&Path>,
) -> Result<SqliteTreeStore, StoreOpenError> {
    let store_error = |source| StoreOpenError::Store {
        path: database_path.to_path_buf(),
        source,
    };
    let store = SqliteTreeStore::open(database_path).map_err(store_error)?;
    let Some(seed) = seed_path else {
        info!(database = %database_path.display(), "store opened");
        return Ok(store);
    };

    let tree = load_snapshot(seed)?;
    let collections = tree.as_object().map_or(0, serde_json::Map::len);
    if store.import_if_empty(&tree).map_err(store_error)? {
        info!(
            database = %database_path.display(),
            seed = %seed.display(),
            collections,
            "store seeded from snapshot"
        );
    } else {
        info!(
            database = %database_path.display(),
            reason = "database already holds data",
            "snapshot skipped"
        );
    }
    Ok(store)
}
