//! Domain primitives, aggregates and services.
//!
//! Purpose: define the proximity-matching and notification engine
//! independently of transport and storage. Services depend only on the
//! traits in [`ports`]; adapters live under `crate::outbound` and
//! `crate::inbound`.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - geo: coordinates, haversine distance, geohash and jitter.
//! - Pet, UserProfile: entities read by every service.
//! - MatchService, MatchRequestService, PlaceTaggingService,
//!   NotificationInboxService, ReminderScheduler, ReminderJob: use cases.

pub mod error;
pub mod geo;
pub mod matching;
pub mod notifications;
pub mod pet;
pub mod places;
pub mod ports;
pub mod reminders;
pub mod requests;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::matching::{
    ActiveCategory, CandidateMatch, MatchConstraints, MatchContext, MatchError, MatchService,
    NEARBY_RADIUS_KM, find_matches,
};
pub use self::notifications::{
    NewNotification, Notification, NotificationDispatcher, NotificationId, NotificationInboxService,
    NotificationKind,
};
pub use self::pet::{Gender, ParsePetAttributeError, Pet, PetId, PetKind, Vaccination};
pub use self::places::{
    FAN_OUT_RADIUS_KM, FanOutReport, NewPlaceTag, PlaceId, PlaceTaggingService, TaggedPlace,
};
pub use self::reminders::{
    JobResponse, ReminderDedupMarker, ReminderJob, ReminderKind, ReminderRunReport,
    ReminderScheduler, reminder_key,
};
pub use self::requests::{
    CLAIM_GRACE_SECS, InvalidTransition, MESSAGE_MAX_CHARS, MatchRequest, MatchRequestService,
    MatchRequestView, NewMatchRequest, PairClaim, RequestDirection, RequestId, RequestPair, RequestStatus,
    RequestValidationError, TransitionOutcome,
};
pub use self::user::{DISPLAY_NAME_MAX, DisplayName, UserId, UserProfile, UserValidationError};
