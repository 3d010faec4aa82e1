//! Port for reminder dedup markers.

use async_trait::async_trait;

use crate::domain::{ReminderDedupMarker, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reminder marker repository adapters.
    pub enum ReminderMarkerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reminder marker repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reminder marker repository query failed: {message}",
    }
}

/// Port for reading and writing dedup markers under `reminders/{uid}/{key}`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderMarkerRepository: Send + Sync {
    /// True when a marker for `key` exists for `user`.
    async fn exists(&self, user: &UserId, key: &str) -> Result<bool, ReminderMarkerRepositoryError>;

    /// Persist a marker.
    async fn record(
        &self,
        marker: &ReminderDedupMarker,
    ) -> Result<(), ReminderMarkerRepositoryError>;
}
