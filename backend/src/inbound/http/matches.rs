//! Proximity match HTTP handler.
//!
//! ```text
//! POST /api/v1/matches
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{FindMatchesRequest, FindMatchesResponse, MatchCandidatePayload};
use crate::domain::{ActiveCategory, Error, MatchConstraints, MatchContext};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, parse_coordinate, parse_id, parse_radius, parse_user_id,
};

/// Latitude/longitude pair as sent by clients.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationBody {
    pub latitude: f64,
    pub longitude: f64,
}

/// Request payload for a match lookup.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesRequestBody {
    #[schema(format = "uuid")]
    pub owner_id: String,
    #[schema(format = "uuid")]
    pub pet_id: String,
    /// Live fix of the caller. Required; a missing fix is rejected with 400.
    pub location: Option<LocationBody>,
    /// `mating` (default) or `adoption`.
    pub context: Option<String>,
    pub max_distance_km: Option<f64>,
    /// `all` (default), `breed` or `nearby`.
    pub active_category: Option<String>,
    pub search: Option<String>,
}

/// One candidate in the response, with its approximate location.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidateBody {
    #[schema(format = "uuid")]
    pub pet_id: String,
    #[schema(format = "uuid")]
    pub owner_id: String,
    pub name: String,
    pub kind: String,
    pub gender: String,
    pub breed: Option<String>,
    pub location: LocationBody,
    pub distance_km: f64,
}

/// Response payload for a match lookup, nearest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponseBody {
    pub matches: Vec<MatchCandidateBody>,
}

impl From<MatchCandidatePayload> for MatchCandidateBody {
    fn from(value: MatchCandidatePayload) -> Self {
        Self {
            pet_id: value.pet_id.to_string(),
            owner_id: value.owner_id.to_string(),
            name: value.name,
            kind: value.kind.to_string(),
            gender: value.gender.to_string(),
            breed: value.breed,
            location: LocationBody {
                latitude: value.location.latitude(),
                longitude: value.location.longitude(),
            },
            distance_km: value.distance_km,
        }
    }
}

impl From<FindMatchesResponse> for FindMatchesResponseBody {
    fn from(value: FindMatchesResponse) -> Self {
        Self {
            matches: value.matches.into_iter().map(Into::into).collect(),
        }
    }
}

fn parse_context(raw: Option<String>) -> Result<MatchContext, Error> {
    match raw.as_deref() {
        None | Some("mating") => Ok(MatchContext::Mating),
        Some("adoption") => Ok(MatchContext::Adoption),
        Some(other) => Err(invalid_value_error(
            FieldName::new("context"),
            other,
            "mating, adoption",
        )),
    }
}

fn parse_category(raw: Option<String>) -> Result<ActiveCategory, Error> {
    match raw.as_deref() {
        None | Some("all") => Ok(ActiveCategory::All),
        Some("breed") => Ok(ActiveCategory::Breed),
        Some("nearby") => Ok(ActiveCategory::Nearby),
        Some(other) => Err(invalid_value_error(
            FieldName::new("activeCategory"),
            other,
            "all, breed, nearby",
        )),
    }
}

fn parse_find_matches(
    body: FindMatchesRequestBody,
    default_radius_km: f64,
) -> Result<FindMatchesRequest, Error> {
    let location = body
        .location
        .map(|fix| parse_coordinate(fix.latitude, fix.longitude, FieldName::new("location")))
        .transpose()?;
    let max_distance_km = parse_radius(
        body.max_distance_km.unwrap_or(default_radius_km),
        FieldName::new("maxDistanceKm"),
    )?;
    let search = body
        .search
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty());
    Ok(FindMatchesRequest {
        owner_id: parse_user_id(&body.owner_id, FieldName::new("ownerId"))?,
        pet_id: parse_id(&body.pet_id, FieldName::new("petId"))?,
        location,
        constraints: MatchConstraints {
            context: parse_context(body.context)?,
            max_distance_km,
            active_category: parse_category(body.active_category)?,
            search,
        },
    })
}

/// Find eligible partners or adopters near a pet, nearest first.
#[utoipa::path(
    post,
    path = "/api/v1/matches",
    request_body = FindMatchesRequestBody,
    responses(
        (status = 200, description = "Eligible candidates", body = FindMatchesResponseBody),
        (status = 400, description = "Invalid request or missing location", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["matches"],
    operation_id = "findMatches"
)]
#[post("/matches")]
pub async fn find_matches(
    state: web::Data<HttpState>,
    payload: web::Json<FindMatchesRequestBody>,
) -> ApiResult<web::Json<FindMatchesResponseBody>> {
    let request = parse_find_matches(payload.into_inner(), state.default_match_radius_km)?;
    let response = state.matches.find_matches(request).await?;
    Ok(web::Json(FindMatchesResponseBody::from(response)))
}

#[cfg(test)]
#[path = "matches_tests.rs"]
mod tests;
