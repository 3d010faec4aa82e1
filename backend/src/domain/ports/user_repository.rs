//! Port for reading user profiles and their spatial bucket index.

use async_trait::async_trait;

use crate::domain::{UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Port for user profile persistence.
///
/// Adapters keep a geohash bucket index of stored locations in step with
/// [`UserRepository::save`] so fan-out can read nearby users without a full
/// scan.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a profile and refresh its bucket membership.
    async fn save(&self, profile: &UserProfile) -> Result<(), UserRepositoryError>;

    /// Find a profile by id.
    async fn find(&self, id: &UserId) -> Result<Option<UserProfile>, UserRepositoryError>;

    /// Every stored profile.
    async fn list_all(&self) -> Result<Vec<UserProfile>, UserRepositoryError>;

    /// Profiles whose stored location falls in any of `cells` (geohash
    /// prefixes at the index precision).
    async fn list_in_cells(
        &self,
        cells: &[String],
    ) -> Result<Vec<UserProfile>, UserRepositoryError>;
}
