//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::geo::Coordinate;
use crate::domain::{Error, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidCoordinate,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidCoordinate => "invalid_coordinate",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("{name} must be a valid UUID"),
        ErrorCode::InvalidUuid,
        value,
    )
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an identifier whose `FromStr` accepts UUID text.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    T::from_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, expected: &str) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("{name} must be one of: {expected}"),
        ErrorCode::InvalidValue,
        value,
    )
}

/// Parse a closed vocabulary value such as a status or direction.
pub(crate) fn parse_enum<T>(value: &str, field: FieldName, expected: &str) -> Result<T, Error>
where
    T: FromStr,
{
    T::from_str(value).map_err(|_| invalid_value_error(field, value, expected))
}

/// Validate a latitude/longitude pair supplied by a client.
pub(crate) fn parse_coordinate(
    latitude: f64,
    longitude: f64,
    field: FieldName,
) -> Result<Coordinate, Error> {
    Coordinate::new(latitude, longitude).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": field.as_str(),
            "latitude": latitude,
            "longitude": longitude,
            "code": ErrorCode::InvalidCoordinate.as_str(),
        }))
    })
}

/// Reject negative or non-finite distances.
pub(crate) fn parse_radius(value: f64, field: FieldName) -> Result<f64, Error> {
    if value.is_finite() && value >= 0.0 {
        return Ok(value);
    }
    let name = field.as_str();
    Err(Error::invalid_request(format!(
        "{name} must be a non-negative number of kilometres"
    ))
    .with_details(json!({
        "field": name,
        "code": ErrorCode::InvalidValue.as_str(),
    })))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{ErrorCode as DomainErrorCode, RequestStatus};

    #[rstest]
    fn malformed_ids_report_field_and_value() {
        let err = parse_user_id("nope", FieldName::new("senderId")).expect_err("invalid");
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "senderId");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(0.0, 180.5)]
    #[case(f64::NAN, 0.0)]
    fn out_of_range_coordinates_are_rejected(#[case] latitude: f64, #[case] longitude: f64) {
        let err = parse_coordinate(latitude, longitude, FieldName::new("location"))
            .expect_err("invalid");
        let details = err.details().expect("details");
        assert_eq!(details["code"], "invalid_coordinate");
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::INFINITY)]
    fn radii_must_be_finite_and_non_negative(#[case] radius: f64) {
        assert!(parse_radius(radius, FieldName::new("maxDistanceKm")).is_err());
    }

    #[rstest]
    fn unknown_status_lists_expected_values() {
        let err = parse_enum::<RequestStatus>(
            "maybe",
            FieldName::new("status"),
            "pending, accepted, declined",
        )
        .expect_err("invalid");
        assert_eq!(err.message(), "status must be one of: pending, accepted, declined");
    }
}
