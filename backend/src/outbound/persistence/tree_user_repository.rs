//! Tree-backed `UserRepository` with a geohash bucket index.
//!
//! Each located profile is also listed under
//! `user_cells/{geohash5}/{uid}`. Saving a profile moves its index entry
//! when the cell changes, and removes it when the location is cleared.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::geo::{FANOUT_CELL_PRECISION, geohash_encode};
use crate::domain::ports::{TreeStore, TreeStoreError, UserRepository, UserRepositoryError};
use crate::domain::{UserId, UserProfile};

use super::layout;
use super::records::UserRecord;
use super::store_error_mapping::{decode, encode, map_basic_store_error};

fn map_store_error(error: TreeStoreError) -> UserRepositoryError {
    map_basic_store_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn cell_of(record: &UserRecord) -> Option<String> {
    record
        .location
        .map(|location| geohash_encode(location, FANOUT_CELL_PRECISION))
}

/// Profiles stored under `users/{uid}`.
#[derive(Clone)]
pub struct TreeUserRepository {
    store: Arc<dyn TreeStore>,
}

impl TreeUserRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }

    /// Drop the bucket index and rebuild it from the stored profiles.
    ///
    /// Needed after loading a snapshot that carries `users` but no
    /// `user_cells`. Returns the number of indexed profiles.
    pub async fn rebuild_cell_index(&self) -> Result<usize, UserRepositoryError> {
        let profiles = self.list_all().await?;
        self.store
            .remove(&layout::user_cells())
            .await
            .map_err(map_store_error)?;
        let mut indexed = 0;
        for profile in &profiles {
            let Some(cell) = cell_of(&UserRecord::from_profile(profile)) else {
                continue;
            };
            let entry = layout::user_cell(&cell).child(profile.id.to_string());
            self.store
                .set(&entry, Value::Bool(true))
                .await
                .map_err(map_store_error)?;
            indexed += 1;
        }
        Ok(indexed)
    }

    async fn load(&self, id: &UserId) -> Result<Option<UserRecord>, TreeStoreError> {
        let path = layout::user(id);
        match self.store.get(&path).await? {
            Some(value) => decode(&path, value).map(Some),
            None => Ok(None),
        }
    }

    fn parse_entry(key: &str, value: Value) -> Option<UserProfile> {
        let id = match UserId::new(key) {
            Ok(id) => id,
            Err(error) => {
                warn!(key, %error, "skipping user with malformed id");
                return None;
            }
        };
        let path = layout::user(&id);
        match decode::<UserRecord>(&path, value) {
            Ok(record) => Some(record.into_profile(id)),
            Err(error) => {
                warn!(%path, %error, "skipping malformed user record");
                None
            }
        }
    }
}

#[async_trait]
impl UserRepository for TreeUserRepository {
    async fn save(&self, profile: &UserProfile) -> Result<(), UserRepositoryError> {
        let path = layout::user(&profile.id);
        let record = UserRecord::from_profile(profile);
        let previous = self.load(&profile.id).await.map_err(map_store_error)?;
        let old_cell = previous.as_ref().and_then(cell_of);
        let new_cell = cell_of(&record);

        let value = encode(&path, &record).map_err(map_store_error)?;
        self.store.set(&path, value).await.map_err(map_store_error)?;

        if let Some(cell) = old_cell.filter(|cell| new_cell.as_ref() != Some(cell)) {
            let entry = layout::user_cell(&cell).child(profile.id.to_string());
            self.store.remove(&entry).await.map_err(map_store_error)?;
        }
        if let Some(cell) = new_cell {
            let entry = layout::user_cell(&cell).child(profile.id.to_string());
            self.store
                .set(&entry, Value::Bool(true))
                .await
                .map_err(map_store_error)?;
        }
        Ok(())
    }

    async fn find(&self, id: &UserId) -> Result<Option<UserProfile>, UserRepositoryError> {
        let record = self.load(id).await.map_err(map_store_error)?;
        Ok(record.map(|record| record.into_profile(id.clone())))
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>, UserRepositoryError> {
        let entries = self
            .store
            .children(&layout::users())
            .await
            .map_err(map_store_error)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| Self::parse_entry(&key, value))
            .collect())
    }

    async fn list_in_cells(
        &self,
        cells: &[String],
    ) -> Result<Vec<UserProfile>, UserRepositoryError> {
        let mut ids = BTreeSet::new();
        for cell in cells {
            let members = self
                .store
                .children(&layout::user_cell(cell))
                .await
                .map_err(map_store_error)?;
            ids.extend(members.into_iter().map(|(key, _)| key));
        }

        let mut profiles = Vec::with_capacity(ids.len());
        for key in ids {
            let Ok(id) = UserId::new(&key) else {
                warn!(key, "skipping bucket entry with malformed id");
                continue;
            };
            match self.load(&id).await.map_err(map_store_error)? {
                Some(record) => profiles.push(record.into_profile(id)),
                None => debug!(user_id = %id, "bucket entry points at a missing profile"),
            }
        }
        Ok(profiles)
    }
}
