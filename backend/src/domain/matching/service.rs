//! Match lookup service over the pet store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::geo::{LocationJitter, round_km};
use crate::domain::ports::{
    FindMatchesRequest, FindMatchesResponse, MatchCandidatePayload, MatchQuery, PetRepository,
    PetRepositoryError,
};
use crate::domain::{Error, Pet};

use super::{CandidateMatch, MatchError, find_matches};

fn map_repository_error(error: PetRepositoryError) -> Error {
    match error {
        PetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("pet repository unavailable: {message}"))
        }
        PetRepositoryError::Query { message } => {
            Error::internal(format!("pet repository error: {message}"))
        }
    }
}

fn map_match_error(error: MatchError) -> Error {
    match error {
        MatchError::LocationRequired => Error::invalid_request(error.to_string()),
    }
}

impl From<CandidateMatch> for MatchCandidatePayload {
    fn from(found: CandidateMatch) -> Self {
        let CandidateMatch {
            pet,
            location,
            distance_km,
        } = found;
        Self {
            pet_id: pet.id,
            owner_id: pet.owner_id,
            name: pet.name,
            kind: pet.kind,
            gender: pet.gender,
            breed: pet.breed,
            location,
            distance_km: round_km(distance_km),
        }
    }
}

/// Match service implementing [`MatchQuery`].
#[derive(Clone)]
pub struct MatchService<P> {
    pets: Arc<P>,
    jitter: Arc<dyn LocationJitter>,
}

impl<P> MatchService<P> {
    /// Create a service reading pets from `pets` and projecting candidate
    /// locations through `jitter`.
    pub fn new(pets: Arc<P>, jitter: Arc<dyn LocationJitter>) -> Self {
        Self { pets, jitter }
    }

    fn project(&self, mut pet: Pet) -> Pet {
        pet.location = pet.location.map(|location| self.jitter.jitter(location));
        pet
    }
}

#[async_trait]
impl<P> MatchQuery for MatchService<P>
where
    P: PetRepository,
{
    async fn find_matches(
        &self,
        request: FindMatchesRequest,
    ) -> Result<FindMatchesResponse, Error> {
        let reference = self
            .pets
            .find(&request.owner_id, &request.pet_id)
            .await
            .map_err(map_repository_error)?;
        let Some(reference) = reference else {
            debug!(pet_id = %request.pet_id, "reference pet not found; no matches");
            return Ok(FindMatchesResponse::default());
        };
        let pool: Vec<Pet> = self
            .pets
            .list_all()
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .filter(|pet| pet.id != reference.id)
            .map(|pet| self.project(pet))
            .collect();

        let matches =
            find_matches(Some(&reference), request.location, &pool, &request.constraints)
                .map_err(map_match_error)?;
        debug!(
            pet_id = %reference.id,
            pool = pool.len(),
            matched = matches.len(),
            "match lookup complete"
        );

        Ok(FindMatchesResponse {
            matches: matches.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
