//! Notifier that only logs.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::ports::{DeliveryReceipt, Notifier, NotifierError};
use crate::domain::{NotificationKind, UserProfile};

use super::message_body;

/// Writes each delivery as a structured `info` event and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(
        &self,
        user: &UserProfile,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<DeliveryReceipt, NotifierError> {
        info!(
            user_id = %user.id,
            %kind,
            subject = kind.subject(),
            body = %message_body(kind, payload),
            "notification delivered to log"
        );
        Ok(DeliveryReceipt::default())
    }
}
