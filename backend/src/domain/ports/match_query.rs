//! Driving port for proximity match lookups.

use async_trait::async_trait;

use crate::domain::geo::Coordinate;
use crate::domain::{Error, Gender, MatchConstraints, PetId, PetKind, UserId};

/// Lookup input: the caller's pet, their live fix and the filter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FindMatchesRequest {
    pub owner_id: UserId,
    pub pet_id: PetId,
    /// Live location fix. Required; the pet's stored location is never used
    /// in its place.
    pub location: Option<Coordinate>,
    pub constraints: MatchConstraints,
}

/// One candidate as exposed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidatePayload {
    pub pet_id: PetId,
    pub owner_id: UserId,
    pub name: String,
    pub kind: PetKind,
    pub gender: Gender,
    pub breed: Option<String>,
    /// Jittered location; never the true fix.
    pub location: Coordinate,
    /// Distance in km rounded to two decimals.
    pub distance_km: f64,
}

/// Lookup result, nearest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchCandidatePayload>,
}

/// Driving port for finding candidate matches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchQuery: Send + Sync {
    /// Find eligible candidates for the caller's pet.
    ///
    /// Returns `InvalidRequest` when the request carries no live fix, and an
    /// empty list when the pet does not exist.
    async fn find_matches(
        &self,
        request: FindMatchesRequest,
    ) -> Result<FindMatchesResponse, Error>;
}
