//! In-app notifications and the recipient's inbox.
//!
//! Notifications are append-only records under `notifications/{uid}/{id}`.
//! The only mutation after creation is the recipient flipping `read`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::UserId;

mod dispatch;
mod inbox;

pub use dispatch::NotificationDispatcher;
pub use inbox::NotificationInboxService;

/// Identifier assigned by the store when a notification is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Wrap a store-assigned child key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for NotificationId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event categories delivered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PetFriendlyPlace,
    MatingRequest,
    RequestAccepted,
    VaccinationReminder,
    BirthdayReminder,
    HealthCheckupReminder,
}

impl NotificationKind {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PetFriendlyPlace => "pet_friendly_place",
            Self::MatingRequest => "mating_request",
            Self::RequestAccepted => "request_accepted",
            Self::VaccinationReminder => "vaccination_reminder",
            Self::BirthdayReminder => "birthday_reminder",
            Self::HealthCheckupReminder => "health_checkup_reminder",
        }
    }

    /// Short human-readable subject line used by outbound transports.
    pub const fn subject(self) -> &'static str {
        match self {
            Self::PetFriendlyPlace => "A pet-friendly place was tagged near you",
            Self::MatingRequest => "You have a new mating request",
            Self::RequestAccepted => "Your mating request was accepted",
            Self::VaccinationReminder => "Vaccination due in one week",
            Self::BirthdayReminder => "A birthday is coming up",
            Self::HealthCheckupReminder => "Time for a health checkup",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pet_friendly_place" => Ok(Self::PetFriendlyPlace),
            "mating_request" => Ok(Self::MatingRequest),
            "request_accepted" => Ok(Self::RequestAccepted),
            "vaccination_reminder" => Ok(Self::VaccinationReminder),
            "birthday_reminder" => Ok(Self::BirthdayReminder),
            "health_checkup_reminder" => Ok(Self::HealthCheckupReminder),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// Notification contents before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_user_id: UserId,
    pub kind: NotificationKind,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    /// Materialise a draft under a store-assigned identifier.
    pub fn from_new(id: NotificationId, draft: NewNotification) -> Self {
        Self {
            id,
            recipient_user_id: draft.recipient,
            kind: draft.kind,
            payload: draft.payload,
            created_at: draft.created_at,
            read: false,
        }
    }
}
