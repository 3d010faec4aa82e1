//! Port for request records, their participant indexes and pair claims.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    MatchRequest, PairClaim, RequestDirection, RequestId, RequestPair, RequestStatus, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by match request repository adapters.
    pub enum MatchRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "match request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "match request repository query failed: {message}",
    }
}

/// Port for request persistence.
///
/// [`MatchRequestRepository::insert`] writes the single source-of-truth
/// record before the two index pointers, so a reader that finds a pointer
/// can always resolve it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRequestRepository: Send + Sync {
    /// Atomically write `claim` on `pair`. Returns `false` when a claim is
    /// already there.
    async fn claim_pair(
        &self,
        pair: &RequestPair,
        claim: &PairClaim,
    ) -> Result<bool, MatchRequestRepositoryError>;

    /// Claim currently on `pair`, if any.
    async fn pair_holder(
        &self,
        pair: &RequestPair,
    ) -> Result<Option<PairClaim>, MatchRequestRepositoryError>;

    /// Swap `stale` for `claim`, only while `stale` is still the stored
    /// claim. Returns whether the swap happened.
    async fn replace_pair_holder(
        &self,
        pair: &RequestPair,
        stale: &PairClaim,
        claim: &PairClaim,
    ) -> Result<bool, MatchRequestRepositoryError>;

    /// Drop the claim on `pair` if `holder` still owns it.
    async fn release_pair(
        &self,
        pair: &RequestPair,
        holder: &RequestId,
    ) -> Result<(), MatchRequestRepositoryError>;

    /// Write the record and both participant index pointers.
    async fn insert(&self, request: &MatchRequest) -> Result<(), MatchRequestRepositoryError>;

    /// Load a record by id.
    async fn find(
        &self,
        id: &RequestId,
    ) -> Result<Option<MatchRequest>, MatchRequestRepositoryError>;

    /// Change the status on the single record.
    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), MatchRequestRepositoryError>;

    /// Requests reachable from `user`'s `direction` index.
    async fn list_for_user(
        &self,
        user: &UserId,
        direction: RequestDirection,
    ) -> Result<Vec<MatchRequest>, MatchRequestRepositoryError>;
}
