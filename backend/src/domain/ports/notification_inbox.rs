//! Driving port for a recipient's notification inbox.

use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationId, UserId};

/// Driving port for reading notifications and flipping `read`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Notifications for `recipient`, newest first.
    async fn list(
        &self,
        recipient: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error>;

    /// Mark one notification read. Idempotent; `NotFound` when absent.
    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<(), Error>;
}
