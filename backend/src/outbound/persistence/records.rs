//! Stored shapes that differ from the domain types.
//!
//! Most records serialise straight from the domain structs. Profiles are
//! keyed by user id, so the id is not repeated inside the stored object.

use serde::{Deserialize, Serialize};

use crate::domain::geo::Coordinate;
use crate::domain::{DisplayName, UserId, UserProfile};

/// Record stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRecord {
    pub display_name: DisplayName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
}

impl UserRecord {
    pub(crate) fn from_profile(profile: &UserProfile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            push_token: profile.push_token.clone(),
            location: profile.location,
        }
    }

    pub(crate) fn into_profile(self, id: UserId) -> UserProfile {
        UserProfile {
            id,
            display_name: self.display_name,
            email: self.email,
            push_token: self.push_token,
            location: self.location,
        }
    }
}
