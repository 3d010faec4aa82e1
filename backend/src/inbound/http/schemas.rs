//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`; the
//! wrappers here mirror their wire shape for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails a precondition.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state, such as a duplicate pair
    /// request or a transition out of a terminal state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The store or another collaborator is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "placeName must not be empty")]
    message: String,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::geo::Coordinate`].
#[derive(ToSchema)]
#[schema(as = crate::domain::geo::Coordinate)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CoordinateSchema {
    #[schema(example = 51.5074, minimum = -90, maximum = 90)]
    latitude: f64,
    #[schema(example = -0.1278, minimum = -180, maximum = 180)]
    longitude: f64,
}

/// OpenAPI schema for [`crate::domain::NotificationKind`].
#[derive(ToSchema)]
#[schema(as = crate::domain::NotificationKind)]
pub enum NotificationKindSchema {
    #[schema(rename = "pet_friendly_place")]
    PetFriendlyPlace,
    #[schema(rename = "mating_request")]
    MatingRequest,
    #[schema(rename = "request_accepted")]
    RequestAccepted,
    #[schema(rename = "vaccination_reminder")]
    VaccinationReminder,
    #[schema(rename = "birthday_reminder")]
    BirthdayReminder,
    #[schema(rename = "health_checkup_reminder")]
    HealthCheckupReminder,
}
