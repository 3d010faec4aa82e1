//! Driving port for the scheduled reminder job.

use async_trait::async_trait;

use crate::domain::JobResponse;

/// Entry point invoked by an external scheduler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderJobTrigger: Send + Sync {
    /// Run one reminder pass. Never fails; failures are encoded in the
    /// response status code.
    async fn invoke(&self) -> JobResponse;
}
