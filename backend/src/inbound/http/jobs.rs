//! Internal batch job trigger.
//!
//! ```text
//! POST /internal/jobs/reminders
//! ```
//!
//! Meant for a cron caller inside the deployment; it is registered outside
//! the public `/api/v1` scope.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, post, web};

use crate::domain::JobResponse;
use crate::inbound::http::state::HttpState;

/// Run one reminder pass and report how many reminders were sent.
///
/// The HTTP status mirrors `statusCode` in the body.
#[utoipa::path(
    post,
    path = "/internal/jobs/reminders",
    responses(
        (status = 200, description = "Reminder run finished", body = JobResponse),
        (status = 500, description = "Reminder run failed", body = JobResponse)
    ),
    tags = ["jobs"],
    operation_id = "runReminders"
)]
#[post("/internal/jobs/reminders")]
pub async fn run_reminders(state: web::Data<HttpState>) -> HttpResponse {
    let outcome = state.reminder_job.invoke().await;
    let status =
        StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(outcome)
}
