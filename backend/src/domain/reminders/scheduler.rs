//! One pass of the daily reminder batch.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, instrument, warn};

use crate::domain::ports::{
    PetRepository, ReminderMarkerRepository, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, NotificationDispatcher, UserProfile};

use super::rules::{DueReminder, due_reminders};
use super::{ReminderDedupMarker, ReminderRunReport};

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Scans every user's pets and sends the reminders due today.
#[derive(Clone)]
pub struct ReminderScheduler {
    users: Arc<dyn UserRepository>,
    pets: Arc<dyn PetRepository>,
    markers: Arc<dyn ReminderMarkerRepository>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

enum Outcome {
    Sent,
    Duplicate,
    Failed,
}

impl ReminderScheduler {
    /// Create a scheduler.
    pub fn new(
        users: Arc<dyn UserRepository>,
        pets: Arc<dyn PetRepository>,
        markers: Arc<dyn ReminderMarkerRepository>,
        dispatcher: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            pets,
            markers,
            dispatcher,
            clock,
        }
    }

    /// Run one pass for the clock's current UTC date.
    ///
    /// Fails only when the user list cannot be read. Every per-user and
    /// per-pet failure is logged, counted and skipped.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<ReminderRunReport, Error> {
        let ran_at = self.clock.utc();
        let today = ran_at.date_naive();
        let mut report = ReminderRunReport {
            sent: 0,
            skipped_duplicates: 0,
            failures: 0,
            ran_at,
        };

        let users = self.users.list_all().await.map_err(map_user_error)?;
        for user in &users {
            let pets = match self.pets.list_for_owner(&user.id).await {
                Ok(pets) => pets,
                Err(error) => {
                    warn!(user_id = %user.id, %error, "skipping user: pets unavailable");
                    report.failures += 1;
                    continue;
                }
            };
            for pet in &pets {
                for due in due_reminders(pet, today) {
                    match self.send_once(user, &due).await {
                        Outcome::Sent => report.sent += 1,
                        Outcome::Duplicate => report.skipped_duplicates += 1,
                        Outcome::Failed => report.failures += 1,
                    }
                }
            }
        }

        info!(
            %today,
            sent = report.sent,
            skipped = report.skipped_duplicates,
            failures = report.failures,
            "reminder run finished"
        );
        Ok(report)
    }

    async fn send_once(&self, user: &UserProfile, due: &DueReminder) -> Outcome {
        match self.markers.exists(&user.id, &due.key).await {
            Ok(true) => {
                debug!(user_id = %user.id, key = %due.key, "reminder already sent today");
                return Outcome::Duplicate;
            }
            Ok(false) => {}
            Err(error) => {
                warn!(user_id = %user.id, key = %due.key, %error, "marker lookup failed");
                return Outcome::Failed;
            }
        }

        let kind = due.kind.notification_kind();
        let payload = due.payload();
        if !self.dispatcher.push(user, kind, &payload).await {
            return Outcome::Failed;
        }

        let marker = ReminderDedupMarker {
            user_id: user.id.clone(),
            key: due.key.clone(),
            sent_at: self.clock.utc(),
            kind: due.kind,
            pet_id: due.pet_id,
        };
        if let Err(error) = self.markers.record(&marker).await {
            warn!(user_id = %user.id, key = %due.key, %error, "failed to write reminder marker");
        }
        if let Err(error) = self.dispatcher.record(&user.id, kind, payload).await {
            warn!(user_id = %user.id, key = %due.key, %error, "failed to record reminder in inbox");
        }
        Outcome::Sent
    }
}
