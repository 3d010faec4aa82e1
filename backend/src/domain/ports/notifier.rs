//! Port for the external email/push delivery transport.
//!
//! Delivery is best effort. Callers log and swallow every
//! [`NotifierError`]; no business operation fails because a notification
//! could not be delivered.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{NotificationKind, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// The transport could not be reached.
        Unavailable { message: String } => "notifier unavailable: {message}",
        /// The transport refused the message.
        Rejected { status: u16, message: String } => "notifier rejected message ({status}): {message}",
        /// The recipient has no usable delivery channel.
        NoChannel { user_id: String } => "user {user_id} has no delivery channel",
    }
}

/// Acknowledgement returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryReceipt {
    /// Transport-specific message id, when one is reported.
    pub transport_id: Option<String>,
}

/// Outbound delivery sink.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a `kind` message with `payload` to `user`.
    async fn notify(
        &self,
        user: &UserProfile,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<DeliveryReceipt, NotifierError>;
}
