//! Reqwest-backed notifier posting to an email/push relay.
//!
//! This adapter owns transport details only: envelope serialisation, the
//! request timeout, and HTTP error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{DeliveryReceipt, Notifier, NotifierError};
use crate::domain::{NotificationKind, UserProfile};

use super::message_body;

/// JSON envelope accepted by the relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMessage {
    /// Email address, or push token when no address is known.
    pub to: String,
    pub kind: NotificationKind,
    pub subject: String,
    pub body: String,
    pub payload: Value,
}

impl WebhookMessage {
    /// Build the envelope for `user`, failing when they have no channel.
    pub fn for_user(
        user: &UserProfile,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<Self, NotifierError> {
        let usable = |address: &&str| !address.trim().is_empty();
        let to = user
            .email
            .as_deref()
            .filter(usable)
            .or_else(|| user.push_token.as_deref().filter(usable))
            .ok_or_else(|| NotifierError::no_channel(user.id.to_string()))?;
        Ok(Self {
            to: to.to_owned(),
            kind,
            subject: kind.subject().to_owned(),
            body: message_body(kind, payload),
            payload: payload.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RelayAck {
    #[serde(default)]
    id: Option<String>,
}

/// Notifier that POSTs [`WebhookMessage`]s to one relay endpoint.
pub struct WebhookNotifier {
    client: Client,
    endpoint: Url,
}

impl WebhookNotifier {
    /// Build a notifier using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Relay URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        user: &UserProfile,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<DeliveryReceipt, NotifierError> {
        let message = WebhookMessage::for_user(user, kind, payload)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&message)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(user_id = %user.id, %kind, %status, "relay accepted notification");
        Ok(parse_receipt(body.as_ref()))
    }
}

fn parse_receipt(body: &[u8]) -> DeliveryReceipt {
    let transport_id = serde_json::from_slice::<RelayAck>(body)
        .ok()
        .and_then(|ack| ack.id);
    DeliveryReceipt { transport_id }
}

fn map_transport_error(error: reqwest::Error) -> NotifierError {
    NotifierError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotifierError {
    NotifierError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
}
