//! Mating requests and their state machine.
//!
//! A request lives at a single `requests/{id}` record. The sender's and the
//! receiver's views are index pointers resolved at read time, so both sides
//! always observe the same status. The ordered `(senderPet, receiverPet)`
//! pair is guarded by a store-level claim while a request is open.
//!
//! ```text
//! pending ──► accepted
//!    │
//!    └──────► declined
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pet::PetId;
use super::user::UserId;

mod service;

pub use service::MatchRequestService;

/// Maximum request message length in characters.
pub const MESSAGE_MAX_CHARS: usize = 500;

/// Time-ordered request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Allocate a new identifier ordered by creation time.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// Result of applying a transition to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status changed.
    Applied,
    /// The request was already in the target terminal state.
    Unchanged,
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move a {from} request to {to}")]
pub struct InvalidTransition {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

impl RequestStatus {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// True for `accepted` and `declined`.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// True while the request holds its pet-pair claim.
    pub const fn holds_pair(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Validate moving from `self` to `target`.
    ///
    /// # Examples
    /// ```
    /// use pawmate::domain::{RequestStatus, TransitionOutcome};
    ///
    /// let pending = RequestStatus::Pending;
    /// assert_eq!(pending.transition(RequestStatus::Accepted), Ok(TransitionOutcome::Applied));
    /// assert_eq!(
    ///     RequestStatus::Accepted.transition(RequestStatus::Accepted),
    ///     Ok(TransitionOutcome::Unchanged)
    /// );
    /// assert!(RequestStatus::Accepted.transition(RequestStatus::Pending).is_err());
    /// ```
    pub fn transition(self, target: Self) -> Result<TransitionOutcome, InvalidTransition> {
        match (self, target) {
            (Self::Pending, Self::Accepted | Self::Declined) => Ok(TransitionOutcome::Applied),
            (from, to) if from == to && from.is_terminal() => Ok(TransitionOutcome::Unchanged),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// Which index a request was read through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDirection {
    Sent,
    Received,
}

impl RequestDirection {
    /// Wire representation, also the index root in the store.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
        }
    }
}

impl FromStr for RequestDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "received" => Ok(Self::Received),
            other => Err(format!("unknown request direction: {other}")),
        }
    }
}

/// The ordered pet pair a request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestPair {
    pub sender_pet: PetId,
    pub receiver_pet: PetId,
}

impl RequestPair {
    /// Store key for the pair claim.
    pub fn key(&self) -> String {
        format!("{}_{}", self.sender_pet, self.receiver_pet)
    }
}

/// Seconds a claim may exist without its request record before it counts as
/// abandoned. Covers the gap between claiming the pair and inserting.
pub const CLAIM_GRACE_SECS: i64 = 30;

/// Store-level claim on a [`RequestPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairClaim {
    pub request_id: RequestId,
    pub claimed_at: DateTime<Utc>,
}

impl PairClaim {
    pub const fn new(request_id: RequestId, claimed_at: DateTime<Utc>) -> Self {
        Self {
            request_id,
            claimed_at,
        }
    }

    /// True while a claim with no record may still belong to a create that
    /// has not inserted yet.
    pub fn in_flight_at(&self, now: DateTime<Utc>) -> bool {
        now - self.claimed_at < TimeDelta::seconds(CLAIM_GRACE_SECS)
    }
}

/// Validation failures for new requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("a user cannot send a request to themselves")]
    SelfRequest,
    #[error("sender and receiver pets must differ")]
    SamePet,
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
}

/// Caller input for a new request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatchRequest {
    pub sender_id: UserId,
    pub sender_pet_id: PetId,
    pub receiver_id: UserId,
    pub receiver_pet_id: PetId,
    pub message: String,
}

impl NewMatchRequest {
    /// Check the preconditions that do not need the store.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.sender_id == self.receiver_id {
            return Err(RequestValidationError::SelfRequest);
        }
        if self.sender_pet_id == self.receiver_pet_id {
            return Err(RequestValidationError::SamePet);
        }
        if self.message.chars().count() > MESSAGE_MAX_CHARS {
            return Err(RequestValidationError::MessageTooLong {
                max: MESSAGE_MAX_CHARS,
            });
        }
        Ok(())
    }

    /// Ordered pet pair for the uniqueness claim.
    pub fn pair(&self) -> RequestPair {
        RequestPair {
            sender_pet: self.sender_pet_id,
            receiver_pet: self.receiver_pet_id,
        }
    }
}

/// Stored request record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub id: RequestId,
    pub sender_id: UserId,
    pub sender_pet_id: PetId,
    pub receiver_id: UserId,
    pub receiver_pet_id: PetId,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRequest {
    /// Materialise a validated draft as a pending request.
    pub fn pending(id: RequestId, draft: NewMatchRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            sender_id: draft.sender_id,
            sender_pet_id: draft.sender_pet_id,
            receiver_id: draft.receiver_id,
            receiver_pet_id: draft.receiver_pet_id,
            message: draft.message,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ordered pet pair of this request.
    pub fn pair(&self) -> RequestPair {
        RequestPair {
            sender_pet: self.sender_pet_id,
            receiver_pet: self.receiver_pet_id,
        }
    }

    /// View the request from one participant's side.
    pub fn viewed_as(self, direction: RequestDirection) -> MatchRequestView {
        MatchRequestView {
            request: self,
            direction,
        }
    }
}

/// A request as read through a participant's index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequestView {
    #[serde(flatten)]
    pub request: MatchRequest,
    pub direction: RequestDirection,
}

#[cfg(test)]
mod tests;
