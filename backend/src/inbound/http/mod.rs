//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod jobs;
pub mod matches;
pub mod notifications;
pub mod places;
pub mod requests;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register the public `/api/v1` scope and the internal job trigger.
///
/// Callers add `web::Data<HttpState>` (and health state for the probes,
/// which are registered separately).
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(matches::find_matches)
            .service(places::tag_place)
            .service(requests::create_request)
            .service(requests::transition_request)
            .service(requests::list_requests)
            .service(notifications::list_notifications)
            .service(notifications::mark_notification_read),
    )
    .service(jobs::run_reminders);
}
