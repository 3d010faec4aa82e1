//! Daily reminder batch: vaccinations, birthdays and health checkups.
//!
//! A run scans every user's pets, decides which reminders are due "today",
//! and sends each one at most once per day. Suppression is keyed by a
//! date-qualified marker under `reminders/{uid}/{key}`, so a condition that
//! stays true (an overdue checkup) is reminded once per day it persists.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::notifications::NotificationKind;
use super::pet::PetId;
use super::user::UserId;

mod job;
mod rules;
mod scheduler;

pub use job::{JobResponse, ReminderJob};
pub use rules::{
    BIRTHDAY_LEAD_DAYS, CHECKUP_INTERVAL_MONTHS, DueReminder, VACCINATION_LEAD_DAYS,
    birthday_in_year, due_reminders, is_birthday_due, is_checkup_due, is_vaccination_due,
};
pub use scheduler::ReminderScheduler;

/// Reminder categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderKind {
    Vaccination,
    Birthday,
    HealthCheckup,
}

impl ReminderKind {
    /// Leading component of dedup keys.
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Vaccination => "vaccination",
            Self::Birthday => "birthday",
            Self::HealthCheckup => "healthCheckup",
        }
    }

    /// Inbox and transport category for this reminder.
    pub const fn notification_kind(self) -> NotificationKind {
        match self {
            Self::Vaccination => NotificationKind::VaccinationReminder,
            Self::Birthday => NotificationKind::BirthdayReminder,
            Self::HealthCheckup => NotificationKind::HealthCheckupReminder,
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_prefix())
    }
}

/// Dedup key for one reminder on one day.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use pawmate::domain::{PetId, ReminderKind, reminder_key};
///
/// let pet: PetId = "6f1c1c2e-8a4b-4c39-9c55-0b8f3a0f7a11".parse().expect("uuid");
/// let today = NaiveDate::from_ymd_opt(2026, 5, 4).expect("date");
/// assert_eq!(
///     reminder_key(ReminderKind::HealthCheckup, &pet, None, today),
///     "healthCheckup_6f1c1c2e-8a4b-4c39-9c55-0b8f3a0f7a11_2026-05-04"
/// );
/// ```
pub fn reminder_key(
    kind: ReminderKind,
    pet: &PetId,
    vaccine_slug: Option<&str>,
    today: NaiveDate,
) -> String {
    let day = today.format("%Y-%m-%d");
    match vaccine_slug {
        Some(slug) => format!("{}_{pet}_{slug}_{day}", kind.key_prefix()),
        None => format!("{}_{pet}_{day}", kind.key_prefix()),
    }
}

/// Persisted proof that a reminder was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDedupMarker {
    pub user_id: UserId,
    pub key: String,
    pub sent_at: DateTime<Utc>,
    pub kind: ReminderKind,
    pub pet_id: PetId,
}

/// Summary of one scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Reminders delivered by the notifier.
    pub sent: usize,
    /// Reminders suppressed by an existing marker.
    pub skipped_duplicates: usize,
    /// Per-item failures that were logged and skipped.
    pub failures: usize,
    /// Instant the run started.
    pub ran_at: DateTime<Utc>,
}
