//! User identity and the profile slice the engine reads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::Coordinate;

/// Reasons a user identifier or display name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
}

/// Owner identifier. Always held in lowercase hyphenated UUID form, which is
/// also how it appears in store paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse a client- or store-supplied identifier.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        id.as_ref().parse()
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::try_parse(raw)
            .map(|uuid| Self(uuid.hyphenated().to_string()))
            .map_err(|_| UserValidationError::InvalidId)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Longest display name, in characters, after trimming.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Name shown next to an owner's pets and requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        match name.trim() {
            "" => Err(UserValidationError::EmptyDisplayName),
            trimmed if trimmed.chars().count() > DISPLAY_NAME_MAX => {
                Err(UserValidationError::DisplayNameTooLong {
                    max: DISPLAY_NAME_MAX,
                })
            }
            trimmed if trimmed.len() == name.len() => Ok(Self(name)),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> Self {
        name.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// The parts of a user record the engine needs: identity, contact channels
/// and the last stored location.
///
/// `location` is the user's own stored fix and is never jittered; it is only
/// used server-side for fan-out distance checks.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: DisplayName,
    pub email: Option<String>,
    pub push_token: Option<String>,
    pub location: Option<Coordinate>,
}

impl UserProfile {
    /// Profile with no contact channel and no stored fix yet.
    pub fn new(id: UserId, display_name: DisplayName) -> Self {
        Self {
            id,
            display_name,
            email: None,
            push_token: None,
            location: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_location(mut self, location: Coordinate) -> Self {
        self.location = Some(location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    fn user_id_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn user_ids_are_normalised_to_lowercase_hyphenated_form() {
        let id = UserId::new("3FA85F6457174562B3FC2C963F66AFA6").expect("valid");
        assert_eq!(id.as_ref(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(
            serde_json::to_value(&id).expect("serialise"),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
    }

    #[rstest]
    fn display_name_is_trimmed_and_bounded() {
        let name = DisplayName::new("  Biscuit's human ").expect("valid");
        assert_eq!(name.as_ref(), "Biscuit's human");

        let long = "x".repeat(DISPLAY_NAME_MAX + 1);
        assert_eq!(
            DisplayName::new(long),
            Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            })
        );
        assert_eq!(
            DisplayName::new("   "),
            Err(UserValidationError::EmptyDisplayName)
        );
    }
}
