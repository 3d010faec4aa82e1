//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`TreeStore`], [`Notifier`]) are implemented
//! by outbound adapters. Driving ports ([`MatchQuery`],
//! [`MatchRequestCommand`], [`PlaceTaggingCommand`], ...) are implemented by
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod match_query;
mod match_request_command;
mod match_request_repository;
mod notification_inbox;
mod notification_repository;
mod notifier;
mod pet_repository;
mod place_repository;
mod place_tagging_command;
mod reminder_job_trigger;
mod reminder_marker_repository;
mod tree_store;
mod user_repository;

#[cfg(test)]
pub use match_query::MockMatchQuery;
pub use match_query::{FindMatchesRequest, FindMatchesResponse, MatchCandidatePayload, MatchQuery};
pub use match_request_command::{MatchRequestCommand, MatchRequestQuery};
#[cfg(test)]
pub use match_request_command::{MockMatchRequestCommand, MockMatchRequestQuery};
#[cfg(test)]
pub use match_request_repository::MockMatchRequestRepository;
pub use match_request_repository::{MatchRequestRepository, MatchRequestRepositoryError};
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::NotificationInbox;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{DeliveryReceipt, Notifier, NotifierError};
#[cfg(test)]
pub use pet_repository::MockPetRepository;
pub use pet_repository::{PetRepository, PetRepositoryError};
#[cfg(test)]
pub use place_repository::MockPlaceRepository;
pub use place_repository::{PlaceRepository, PlaceRepositoryError};
#[cfg(test)]
pub use place_tagging_command::MockPlaceTaggingCommand;
pub use place_tagging_command::{PlaceTaggingCommand, TagPlaceResponse};
#[cfg(test)]
pub use reminder_job_trigger::MockReminderJobTrigger;
pub use reminder_job_trigger::ReminderJobTrigger;
#[cfg(test)]
pub use reminder_marker_repository::MockReminderMarkerRepository;
pub use reminder_marker_repository::{ReminderMarkerRepository, ReminderMarkerRepositoryError};
#[cfg(test)]
pub use tree_store::MockTreeStore;
pub use tree_store::{StoreChange, StorePath, StoreSubscription, TreeStore, TreeStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
