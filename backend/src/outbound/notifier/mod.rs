//! Outbound delivery transports implementing the `Notifier` port.
//!
//! - [`WebhookNotifier`] posts a JSON envelope to an email/push relay.
//! - [`LoggingNotifier`] writes deliveries to the log; used when no relay is
//!   configured.

use serde_json::Value;

use crate::domain::NotificationKind;

mod logging;
mod webhook;

pub use logging::LoggingNotifier;
pub use webhook::{WebhookMessage, WebhookNotifier};

fn text(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Plain-text body for a delivery, built from the fields each payload kind
/// carries.
pub fn message_body(kind: NotificationKind, payload: &Value) -> String {
    let pet = text(payload, "petName").unwrap_or_else(|| "your pet".to_owned());
    match kind {
        NotificationKind::PetFriendlyPlace => {
            let place = text(payload, "placeName").unwrap_or_else(|| "A place".to_owned());
            match payload.get("distanceKm").and_then(Value::as_f64) {
                Some(km) => format!("{place} was tagged {km:.2} km from you."),
                None => format!("{place} was tagged near you."),
            }
        }
        NotificationKind::MatingRequest => match text(payload, "message") {
            Some(message) if !message.is_empty() => {
                format!("Someone would like to meet your pet: \"{message}\"")
            }
            _ => "Someone would like to meet your pet.".to_owned(),
        },
        NotificationKind::RequestAccepted => "Your mating request was accepted.".to_owned(),
        NotificationKind::VaccinationReminder => {
            let vaccine = text(payload, "vaccine").unwrap_or_else(|| "A vaccination".to_owned());
            match text(payload, "date") {
                Some(date) => format!("{vaccine} for {pet} is due on {date}."),
                None => format!("{vaccine} for {pet} is due in one week."),
            }
        }
        NotificationKind::BirthdayReminder => match text(payload, "date") {
            Some(date) => format!("{pet}'s birthday is on {date}."),
            None => format!("{pet}'s birthday is in three days."),
        },
        NotificationKind::HealthCheckupReminder => match text(payload, "date") {
            Some(date) => format!("{pet} last had a checkup on {date}. Time to book another."),
            None => format!("{pet} has no recorded checkup. Time to book one."),
        },
    }
}
