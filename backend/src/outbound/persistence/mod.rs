//! Repositories persisted in the shared JSON tree.
//!
//! Every adapter here implements one domain repository port on top of the
//! [`TreeStore`](crate::domain::ports::TreeStore) port, so any tree backend
//! can sit underneath them.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between stored JSON and domain
//!   types. Business rules (pair uniqueness decisions, radius checks, dedup)
//!   stay in the domain services.
//! - **Fixed layout**: paths are built in one place (`layout`), never by
//!   string concatenation at call sites.
//! - **Tolerant listing**: list operations skip records that fail to decode
//!   and log them; single-record reads report them as query errors.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pawmate::outbound::persistence::TreeUserRepository;
//! use pawmate::outbound::store::MemoryTreeStore;
//!
//! let users = TreeUserRepository::new(Arc::new(MemoryTreeStore::new()));
//! # let _ = users;
//! ```

mod layout;
mod records;
mod store_error_mapping;
mod tree_match_request_repository;
mod tree_notification_repository;
mod tree_pet_repository;
mod tree_place_repository;
mod tree_reminder_marker_repository;
mod tree_user_repository;

pub use tree_match_request_repository::TreeMatchRequestRepository;
pub use tree_notification_repository::TreeNotificationRepository;
pub use tree_pet_repository::TreePetRepository;
pub use tree_place_repository::TreePlaceRepository;
pub use tree_reminder_marker_repository::TreeReminderMarkerRepository;
pub use tree_user_repository::TreeUserRepository;
