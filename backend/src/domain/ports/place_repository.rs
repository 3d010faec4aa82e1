//! Port for tagged place persistence.

use async_trait::async_trait;

use crate::domain::{PlaceId, TaggedPlace};

use super::define_port_error;

define_port_error! {
    /// Errors raised by place repository adapters.
    pub enum PlaceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "place repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "place repository query failed: {message}",
    }
}

/// Port for writing and reading tagged places.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Persist a new place.
    async fn insert(&self, place: &TaggedPlace) -> Result<(), PlaceRepositoryError>;

    /// Load a place by id.
    async fn find(&self, id: &PlaceId) -> Result<Option<TaggedPlace>, PlaceRepositoryError>;
}
