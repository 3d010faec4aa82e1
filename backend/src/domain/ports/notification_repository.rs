//! Port for the per-recipient notification inbox.

use async_trait::async_trait;

use crate::domain::{NewNotification, Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Port for appending to and reading a recipient's inbox.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Append a notification; the store assigns its id.
    async fn append(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, NotificationRepositoryError>;

    /// Every notification addressed to `recipient`, in store key order.
    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Set `read` on one notification. Returns `false` when it does not exist.
    async fn mark_read(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;
}
