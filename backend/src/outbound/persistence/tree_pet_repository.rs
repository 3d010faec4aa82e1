//! Tree-backed `PetRepository` storing pets under `pets/{uid}/{petId}`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{PetRepository, PetRepositoryError, StorePath, TreeStore, TreeStoreError};
use crate::domain::{Pet, PetId, UserId};

use super::layout;
use super::store_error_mapping::{decode, encode, map_basic_store_error};

fn map_store_error(error: TreeStoreError) -> PetRepositoryError {
    map_basic_store_error(error, PetRepositoryError::query, PetRepositoryError::connection)
}

fn decode_pets(owner_path: &StorePath, pets: Vec<(String, Value)>) -> Vec<Pet> {
    pets.into_iter()
        .filter_map(|(key, value)| {
            let path = owner_path.child(key);
            match decode::<Pet>(&path, value) {
                Ok(pet) => Some(pet),
                Err(error) => {
                    warn!(%path, %error, "skipping malformed pet record");
                    None
                }
            }
        })
        .collect()
}

/// Pets stored beneath their owner.
#[derive(Clone)]
pub struct TreePetRepository {
    store: Arc<dyn TreeStore>,
}

impl TreePetRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PetRepository for TreePetRepository {
    async fn save(&self, pet: &Pet) -> Result<(), PetRepositoryError> {
        let path = layout::pet(&pet.owner_id, &pet.id);
        let value = encode(&path, pet).map_err(map_store_error)?;
        self.store.set(&path, value).await.map_err(map_store_error)
    }

    async fn find(&self, owner: &UserId, pet_id: &PetId) -> Result<Option<Pet>, PetRepositoryError> {
        let path = layout::pet(owner, pet_id);
        let Some(value) = self.store.get(&path).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        decode(&path, value).map(Some).map_err(map_store_error)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Pet>, PetRepositoryError> {
        let path = layout::owner_pets(owner);
        let pets = self.store.children(&path).await.map_err(map_store_error)?;
        Ok(decode_pets(&path, pets))
    }

    async fn list_all(&self) -> Result<Vec<Pet>, PetRepositoryError> {
        let root = layout::pets();
        let owners = self.store.children(&root).await.map_err(map_store_error)?;
        let mut all = Vec::new();
        for (owner, pets) in owners {
            let Value::Object(pets) = pets else {
                warn!(owner, "skipping non-object pet collection");
                continue;
            };
            all.extend(decode_pets(&root.child(owner), pets.into_iter().collect()));
        }
        Ok(all)
    }
}
