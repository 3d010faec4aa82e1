//! Scheduler-facing wrapper around a reminder run.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::ports::ReminderJobTrigger;

use super::ReminderScheduler;

/// Envelope returned to the external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    /// `200` when the run completed, `500` when it could not start.
    #[schema(example = 200)]
    pub status_code: u16,
    /// Reminders delivered by the notifier.
    pub emails_sent: usize,
    pub timestamp: DateTime<Utc>,
}

impl JobResponse {
    /// True for a completed run.
    pub const fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Reminder job entry point.
#[derive(Clone)]
pub struct ReminderJob {
    scheduler: ReminderScheduler,
    clock: Arc<dyn Clock>,
}

impl ReminderJob {
    pub fn new(scheduler: ReminderScheduler, clock: Arc<dyn Clock>) -> Self {
        Self { scheduler, clock }
    }
}

#[async_trait]
impl ReminderJobTrigger for ReminderJob {
    async fn invoke(&self) -> JobResponse {
        match self.scheduler.run().await {
            Ok(report) => JobResponse {
                status_code: 200,
                emails_sent: report.sent,
                timestamp: report.ran_at,
            },
            Err(err) => {
                error!(code = ?err.code(), message = %err.message(), "reminder run failed");
                JobResponse {
                    status_code: 500,
                    emails_sent: 0,
                    timestamp: self.clock.utc(),
                }
            }
        }
    }
}
