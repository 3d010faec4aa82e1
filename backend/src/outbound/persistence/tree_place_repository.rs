//! Tree-backed `PlaceRepository` storing places under `places/{id}`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{PlaceRepository, PlaceRepositoryError, TreeStore, TreeStoreError};
use crate::domain::{PlaceId, TaggedPlace};

use super::layout;
use super::store_error_mapping::{decode, encode, map_basic_store_error};

fn map_store_error(error: TreeStoreError) -> PlaceRepositoryError {
    map_basic_store_error(
        error,
        PlaceRepositoryError::query,
        PlaceRepositoryError::connection,
    )
}

/// Immutable place records.
#[derive(Clone)]
pub struct TreePlaceRepository {
    store: Arc<dyn TreeStore>,
}

impl TreePlaceRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PlaceRepository for TreePlaceRepository {
    async fn insert(&self, place: &TaggedPlace) -> Result<(), PlaceRepositoryError> {
        let path = layout::place(&place.id);
        let value = encode(&path, place).map_err(map_store_error)?;
        self.store.set(&path, value).await.map_err(map_store_error)
    }

    async fn find(&self, id: &PlaceId) -> Result<Option<TaggedPlace>, PlaceRepositoryError> {
        let path = layout::place(id);
        let Some(value) = self.store.get(&path).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        decode(&path, value).map(Some).map_err(map_store_error)
    }
}
