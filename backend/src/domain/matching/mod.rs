//! Proximity matching between pets.
//!
//! [`find_matches`] is the pure filter: given a reference pet, its location
//! fix and a candidate pool it returns the eligible candidates ordered by
//! distance. [`MatchService`] loads the pool from the store and applies
//! location jitter before filtering.

use serde::{Deserialize, Serialize};

use super::geo::{Coordinate, haversine_distance_km};
use super::pet::Pet;

mod service;

pub use service::MatchService;

/// Radius applied by [`ActiveCategory::Nearby`], independent of the caller's
/// slider value.
pub const NEARBY_RADIUS_KM: f64 = 5.0;

/// Which availability flag a candidate must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchContext {
    #[default]
    Mating,
    Adoption,
}

/// Optional refinement applied after the base predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveCategory {
    #[default]
    All,
    Breed,
    Nearby,
}

/// Caller-supplied filter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConstraints {
    pub context: MatchContext,
    pub max_distance_km: f64,
    pub active_category: ActiveCategory,
    pub search: Option<String>,
}

impl MatchConstraints {
    /// Plain radius filter with no refinements.
    pub fn within(max_distance_km: f64) -> Self {
        Self {
            context: MatchContext::Mating,
            max_distance_km,
            active_category: ActiveCategory::All,
            search: None,
        }
    }
}

/// One eligible candidate, the location it was measured at and its distance
/// from the reference fix.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    pub pet: Pet,
    pub location: Coordinate,
    pub distance_km: f64,
}

/// Failures raised by [`find_matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The reference has no location fix.
    #[error("location required")]
    LocationRequired,
}

/// Filter `pool` against `reference` and order the survivors by distance.
///
/// `reference_location` is the caller's live fix; candidates are measured at
/// their own stored (already projected) location and skipped when they have
/// none. Ties keep pool order.
///
/// # Examples
/// ```
/// use pawmate::domain::geo::Coordinate;
/// use pawmate::domain::{Gender, MatchConstraints, Pet, PetKind, UserId, find_matches};
///
/// let here = Coordinate::new(0.0, 0.0).expect("valid");
/// let me = Pet::new(UserId::random(), "Rex", PetKind::Dog, Gender::Male).with_location(here);
/// let pool = vec![
///     Pet::new(UserId::random(), "Bella", PetKind::Dog, Gender::Female)
///         .with_location(Coordinate::new(0.0, 0.01).expect("valid"))
///         .available_for_mating(),
/// ];
/// let found = find_matches(Some(&me), Some(here), &pool, &MatchConstraints::within(10.0))
///     .expect("location present");
/// assert_eq!(found.len(), 1);
/// ```
pub fn find_matches(
    reference: Option<&Pet>,
    reference_location: Option<Coordinate>,
    pool: &[Pet],
    constraints: &MatchConstraints,
) -> Result<Vec<CandidateMatch>, MatchError> {
    let Some(reference) = reference else {
        return Ok(Vec::new());
    };
    let origin = reference_location.ok_or(MatchError::LocationRequired)?;
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    let search = constraints
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<CandidateMatch> = pool
        .iter()
        .filter_map(|candidate| {
            let location = candidate.location?;
            let distance_km = haversine_distance_km(origin, location);
            passes_base_predicate(reference, candidate, distance_km, constraints).then_some(
                CandidateMatch {
                    pet: candidate.clone(),
                    location,
                    distance_km,
                },
            )
        })
        .filter(|found| passes_category(reference, found, constraints.active_category))
        .filter(|found| {
            search
                .as_deref()
                .is_none_or(|needle| matches_search(&found.pet, needle))
        })
        .collect();

    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(matches)
}

fn passes_base_predicate(
    reference: &Pet,
    candidate: &Pet,
    distance_km: f64,
    constraints: &MatchConstraints,
) -> bool {
    let available = match constraints.context {
        MatchContext::Mating => candidate.available_for_mating,
        MatchContext::Adoption => candidate.available_for_adoption,
    };
    candidate.kind == reference.kind
        && candidate.gender != reference.gender
        && available
        && distance_km <= constraints.max_distance_km
        && candidate.owner_id != reference.owner_id
}

fn passes_category(reference: &Pet, found: &CandidateMatch, category: ActiveCategory) -> bool {
    match category {
        ActiveCategory::All => true,
        ActiveCategory::Nearby => found.distance_km < NEARBY_RADIUS_KM,
        ActiveCategory::Breed => match (&reference.breed, &found.pet.breed) {
            (Some(mine), Some(theirs)) => mine.trim().eq_ignore_ascii_case(theirs.trim()),
            _ => false,
        },
    }
}

fn matches_search(pet: &Pet, needle: &str) -> bool {
    [
        Some(pet.name.as_str()),
        pet.breed.as_deref(),
        pet.description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}
