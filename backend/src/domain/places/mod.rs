//! Tagged places and nearby-user fan-out.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::Coordinate;
use super::user::UserId;

mod service;

pub use service::PlaceTaggingService;

/// Users within this great-circle distance of a new place are notified.
pub const FAN_OUT_RADIUS_KM: f64 = 1.0;

/// Time-ordered place identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(Uuid);

impl PlaceId {
    /// Allocate a new identifier ordered by creation time.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PlaceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Caller input for tagging a place.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlaceTag {
    pub tagger: UserId,
    pub location: Coordinate,
    pub place_name: String,
    pub is_pet_friendly: bool,
    pub comment: String,
}

/// Immutable place record stored under `places/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedPlace {
    pub id: PlaceId,
    pub place_name: String,
    pub location: Coordinate,
    pub geohash: String,
    pub is_pet_friendly: bool,
    pub comment: String,
    pub tagger_user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one fan-out round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanOutReport {
    /// Users who received an inbox notification.
    pub notified: usize,
    /// Users whose notification could not be written.
    pub failed: usize,
}

#[cfg(test)]
mod tests;
