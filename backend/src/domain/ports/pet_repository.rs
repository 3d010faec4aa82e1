//! Port for pet profile persistence.

use async_trait::async_trait;

use crate::domain::{Pet, PetId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by pet repository adapters.
    pub enum PetRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "pet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "pet repository query failed: {message}",
    }
}

/// Port for reading and writing pets stored under their owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Persist a pet under its owner.
    async fn save(&self, pet: &Pet) -> Result<(), PetRepositoryError>;

    /// Find one of `owner`'s pets.
    async fn find(&self, owner: &UserId, pet_id: &PetId) -> Result<Option<Pet>, PetRepositoryError>;

    /// Pets belonging to `owner`.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Pet>, PetRepositoryError>;

    /// Every pet in the store, grouped by owner in store key order.
    async fn list_all(&self) -> Result<Vec<Pet>, PetRepositoryError>;
}
