//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the schema wrappers in [`crate::inbound::http::schemas`], which keep
//! domain types free of utoipa derives.
//!
//! Exported via `cargo run --bin openapi-dump` for client generation.

use utoipa::OpenApi;

use crate::domain::JobResponse;
use crate::inbound::http::matches::{
    FindMatchesRequestBody, FindMatchesResponseBody, LocationBody, MatchCandidateBody,
};
use crate::inbound::http::notifications::NotificationBody;
use crate::inbound::http::places::{
    FanOutBody, TagPlaceRequestBody, TagPlaceResponseBody, TaggedPlaceBody,
};
use crate::inbound::http::requests::{
    CreateRequestBody, CreateRequestResponseBody, MatchRequestBody, TransitionBody,
};
use crate::inbound::http::schemas::{
    CoordinateSchema, ErrorCodeSchema, ErrorSchema, NotificationKindSchema,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pawmate engine API",
        description = "Proximity matching, mating requests, place tagging and notification inbox."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::matches::find_matches,
        crate::inbound::http::places::tag_place,
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::transition_request,
        crate::inbound::http::requests::list_requests,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_notification_read,
        crate::inbound::http::jobs::run_reminders,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CoordinateSchema,
        NotificationKindSchema,
        LocationBody,
        FindMatchesRequestBody,
        FindMatchesResponseBody,
        MatchCandidateBody,
        TagPlaceRequestBody,
        TagPlaceResponseBody,
        TaggedPlaceBody,
        FanOutBody,
        CreateRequestBody,
        CreateRequestResponseBody,
        TransitionBody,
        MatchRequestBody,
        NotificationBody,
        JobResponse,
    )),
    tags(
        (name = "matches", description = "Proximity matching"),
        (name = "requests", description = "Mating request lifecycle"),
        (name = "places", description = "Pet-friendly place tagging"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "jobs", description = "Internal batch triggers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    #[case("/api/v1/matches")]
    #[case("/api/v1/places")]
    #[case("/api/v1/requests")]
    #[case("/api/v1/requests/{id}/status")]
    #[case("/api/v1/users/{id}/requests")]
    #[case("/api/v1/users/{id}/notifications")]
    #[case("/internal/jobs/reminders")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
