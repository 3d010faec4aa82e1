//! Inbox write plus best-effort transport push.

use std::sync::Arc;

use mockable::Clock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ports::{
    NotificationRepository, NotificationRepositoryError, Notifier, UserRepository,
};
use crate::domain::{UserId, UserProfile};

use super::{NewNotification, Notification, NotificationKind};

/// Records notifications in the recipient's inbox and pushes them through
/// the external transport.
///
/// The inbox write and the push are independent. An inbox failure is
/// returned after the push has been attempted; transport errors are logged
/// and never surface.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl NotificationDispatcher {
    /// Create a dispatcher.
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            users,
            notifier,
            clock,
        }
    }

    /// Deliver to a recipient whose profile is already loaded.
    pub async fn deliver(
        &self,
        profile: &UserProfile,
        kind: NotificationKind,
        payload: Value,
    ) -> Result<Notification, NotificationRepositoryError> {
        let recorded = self.record(&profile.id, kind, payload.clone()).await;
        self.push(profile, kind, &payload).await;
        recorded
    }

    /// Deliver to a recipient by id, loading the profile for the push.
    pub async fn deliver_to(
        &self,
        recipient: &UserId,
        kind: NotificationKind,
        payload: Value,
    ) -> Result<Notification, NotificationRepositoryError> {
        let recorded = self.record(recipient, kind, payload.clone()).await;
        match self.users.find(recipient).await {
            Ok(Some(profile)) => {
                self.push(&profile, kind, &payload).await;
            }
            Ok(None) => {
                warn!(user_id = %recipient, %kind, "recipient profile missing; push skipped");
            }
            Err(error) => {
                warn!(user_id = %recipient, %kind, %error, "recipient lookup failed; push skipped");
            }
        }
        recorded
    }

    /// Push through the transport only. Returns whether delivery succeeded.
    pub async fn push(
        &self,
        profile: &UserProfile,
        kind: NotificationKind,
        payload: &Value,
    ) -> bool {
        match self.notifier.notify(profile, kind, payload).await {
            Ok(receipt) => {
                debug!(
                    user_id = %profile.id,
                    %kind,
                    transport_id = receipt.transport_id.as_deref(),
                    "notification pushed"
                );
                true
            }
            Err(error) => {
                warn!(user_id = %profile.id, %kind, %error, "notification push failed");
                false
            }
        }
    }

    /// Append an inbox entry only.
    pub async fn record(
        &self,
        recipient: &UserId,
        kind: NotificationKind,
        payload: Value,
    ) -> Result<Notification, NotificationRepositoryError> {
        self.notifications
            .append(NewNotification {
                recipient: recipient.clone(),
                kind,
                payload,
                created_at: self.clock.utc(),
            })
            .await
            .inspect_err(|error| {
                warn!(user_id = %recipient, %kind, %error, "inbox append failed");
            })
    }
}
