//! Inbox service implementing [`NotificationInbox`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{NotificationInbox, NotificationRepository, NotificationRepositoryError};
use crate::domain::{Error, UserId};

use super::{Notification, NotificationId};

fn map_repository_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

/// Reads and acknowledges a recipient's notifications.
#[derive(Clone)]
pub struct NotificationInboxService<R> {
    notifications: Arc<R>,
}

impl<R> NotificationInboxService<R> {
    /// Create a service over the notification repository.
    pub fn new(notifications: Arc<R>) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl<R> NotificationInbox for NotificationInboxService<R>
where
    R: NotificationRepository,
{
    async fn list(
        &self,
        recipient: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error> {
        let mut entries = self
            .notifications
            .list_for(&recipient)
            .await
            .map_err(map_repository_error)?;
        if unread_only {
            entries.retain(|entry| !entry.read);
        }
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_ref().cmp(a.id.as_ref()))
        });
        Ok(entries)
    }

    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<(), Error> {
        let found = self
            .notifications
            .mark_read(&recipient, &id)
            .await
            .map_err(map_repository_error)?;
        if found {
            Ok(())
        } else {
            Err(Error::not_found(format!("notification {id} not found")))
        }
    }
}
