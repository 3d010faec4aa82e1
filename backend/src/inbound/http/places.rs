//! Place tagging HTTP handler.
//!
//! ```text
//! POST /api/v1/places
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::TagPlaceResponse;
use crate::domain::{Error, NewPlaceTag};
use crate::inbound::http::ApiResult;
use crate::inbound::http::matches::LocationBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_coordinate, parse_user_id};

/// Request payload for tagging a place.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagPlaceRequestBody {
    #[schema(format = "uuid")]
    pub tagger_user_id: String,
    pub location: LocationBody,
    pub place_name: String,
    pub is_pet_friendly: bool,
    pub comment: String,
}

/// Stored place as returned to the tagger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaggedPlaceBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub place_name: String,
    pub location: LocationBody,
    pub geohash: String,
    pub is_pet_friendly: bool,
    pub comment: String,
    #[schema(format = "uuid")]
    pub tagger_user_id: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

/// Counts from the best-effort fan-out round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FanOutBody {
    pub notified: usize,
    pub failed: usize,
}

/// Response payload for a tagged place.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagPlaceResponseBody {
    pub place: TaggedPlaceBody,
    pub fan_out: FanOutBody,
}

impl From<TagPlaceResponse> for TagPlaceResponseBody {
    fn from(value: TagPlaceResponse) -> Self {
        let TagPlaceResponse { place, fan_out } = value;
        Self {
            place: TaggedPlaceBody {
                id: place.id.to_string(),
                place_name: place.place_name,
                location: LocationBody {
                    latitude: place.location.latitude(),
                    longitude: place.location.longitude(),
                },
                geohash: place.geohash,
                is_pet_friendly: place.is_pet_friendly,
                comment: place.comment,
                tagger_user_id: place.tagger_user_id.to_string(),
                created_at: place.created_at.to_rfc3339(),
            },
            fan_out: FanOutBody {
                notified: fan_out.notified,
                failed: fan_out.failed,
            },
        }
    }
}

fn parse_tag(body: TagPlaceRequestBody) -> Result<NewPlaceTag, Error> {
    Ok(NewPlaceTag {
        tagger: parse_user_id(&body.tagger_user_id, FieldName::new("taggerUserId"))?,
        location: parse_coordinate(
            body.location.latitude,
            body.location.longitude,
            FieldName::new("location"),
        )?,
        place_name: body.place_name,
        is_pet_friendly: body.is_pet_friendly,
        comment: body.comment,
    })
}

/// Tag a place and notify users within one kilometre of it.
///
/// The place is stored before notifications go out; notification failures
/// only show up in `fanOut.failed`.
#[utoipa::path(
    post,
    path = "/api/v1/places",
    request_body = TagPlaceRequestBody,
    responses(
        (status = 201, description = "Place tagged", body = TagPlaceResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["places"],
    operation_id = "tagPlace"
)]
#[post("/places")]
pub async fn tag_place(
    state: web::Data<HttpState>,
    payload: web::Json<TagPlaceRequestBody>,
) -> ApiResult<HttpResponse> {
    let tag = parse_tag(payload.into_inner())?;
    let response = state.places.tag_place(tag).await?;
    Ok(HttpResponse::Created().json(TagPlaceResponseBody::from(response)))
}
