//! Mating request HTTP handlers.
//!
//! ```text
//! POST /api/v1/requests
//! POST /api/v1/requests/{id}/status
//! GET  /api/v1/users/{id}/requests?direction=sent|received
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, MatchRequest, MatchRequestView, NewMatchRequest, RequestDirection, RequestId,
    RequestStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_enum, parse_id, parse_user_id};

/// Request payload for sending a mating request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[schema(format = "uuid")]
    pub sender_id: String,
    #[schema(format = "uuid")]
    pub sender_pet_id: String,
    #[schema(format = "uuid")]
    pub receiver_id: String,
    #[schema(format = "uuid")]
    pub receiver_pet_id: String,
    /// Optional note, at most 500 characters.
    #[serde(default)]
    pub message: String,
}

/// Response payload for a created request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestResponseBody {
    #[schema(format = "uuid")]
    pub request_id: String,
}

/// Request payload for a status change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
    /// `accepted` or `declined`.
    pub status: String,
}

/// A request as seen by one participant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequestBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub sender_id: String,
    #[schema(format = "uuid")]
    pub sender_pet_id: String,
    #[schema(format = "uuid")]
    pub receiver_id: String,
    #[schema(format = "uuid")]
    pub receiver_pet_id: String,
    pub message: String,
    pub status: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    /// Present on list responses: `sent` or `received`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl MatchRequestBody {
    fn from_request(request: MatchRequest, direction: Option<RequestDirection>) -> Self {
        Self {
            id: request.id.to_string(),
            sender_id: request.sender_id.to_string(),
            sender_pet_id: request.sender_pet_id.to_string(),
            receiver_id: request.receiver_id.to_string(),
            receiver_pet_id: request.receiver_pet_id.to_string(),
            message: request.message,
            status: request.status.to_string(),
            created_at: request.created_at.to_rfc3339(),
            updated_at: request.updated_at.to_rfc3339(),
            direction: direction.map(|side| side.as_str().to_owned()),
        }
    }
}

impl From<MatchRequest> for MatchRequestBody {
    fn from(value: MatchRequest) -> Self {
        Self::from_request(value, None)
    }
}

impl From<MatchRequestView> for MatchRequestBody {
    fn from(value: MatchRequestView) -> Self {
        Self::from_request(value.request, Some(value.direction))
    }
}

/// Query string for listing a user's requests.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListRequestsQuery {
    /// `sent` or `received`.
    pub direction: String,
}

fn parse_create(body: CreateRequestBody) -> Result<NewMatchRequest, Error> {
    Ok(NewMatchRequest {
        sender_id: parse_user_id(&body.sender_id, FieldName::new("senderId"))?,
        sender_pet_id: parse_id(&body.sender_pet_id, FieldName::new("senderPetId"))?,
        receiver_id: parse_user_id(&body.receiver_id, FieldName::new("receiverId"))?,
        receiver_pet_id: parse_id(&body.receiver_pet_id, FieldName::new("receiverPetId"))?,
        message: body.message,
    })
}

/// Send a mating request from one pet to another.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestBody,
    responses(
        (status = 201, description = "Request created", body = CreateRequestResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "An open request already exists for this pair", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    payload: web::Json<CreateRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = parse_create(payload.into_inner())?;
    let id = state.requests.create_request(draft).await?;
    Ok(HttpResponse::Created().json(CreateRequestResponseBody {
        request_id: id.to_string(),
    }))
}

/// Accept or decline a pending request.
///
/// Repeating the transition a request already reached succeeds without
/// sending anything.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/status",
    params(("id" = String, Path, description = "Request identifier")),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Request after the transition", body = MatchRequestBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Transition not allowed", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "transitionRequest"
)]
#[post("/requests/{id}/status")]
pub async fn transition_request(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TransitionBody>,
) -> ApiResult<web::Json<MatchRequestBody>> {
    let id: RequestId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let status: RequestStatus = parse_enum(
        &payload.status,
        FieldName::new("status"),
        "pending, accepted, declined",
    )?;
    let request = state.requests.transition(id, status).await?;
    Ok(web::Json(MatchRequestBody::from(request)))
}

/// List requests a user sent or received, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/requests",
    params(("id" = String, Path, description = "User identifier"), ListRequestsQuery),
    responses(
        (status = 200, description = "Requests", body = [MatchRequestBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/users/{id}/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ListRequestsQuery>,
) -> ApiResult<web::Json<Vec<MatchRequestBody>>> {
    let user = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let direction: RequestDirection =
        parse_enum(&query.direction, FieldName::new("direction"), "sent, received")?;
    let views = state.requests_query.list_requests(user, direction).await?;
    Ok(web::Json(views.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
