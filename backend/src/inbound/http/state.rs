//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    MatchQuery, MatchRequestCommand, MatchRequestQuery, NotificationInbox, PlaceTaggingCommand,
    ReminderJobTrigger,
};

/// Match radius applied when a client omits `maxDistanceKm`.
pub const DEFAULT_MATCH_RADIUS_KM: f64 = 50.0;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub matches: Arc<dyn MatchQuery>,
    pub requests: Arc<dyn MatchRequestCommand>,
    pub requests_query: Arc<dyn MatchRequestQuery>,
    pub places: Arc<dyn PlaceTaggingCommand>,
    pub inbox: Arc<dyn NotificationInbox>,
    pub reminder_job: Arc<dyn ReminderJobTrigger>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub matches: Arc<dyn MatchQuery>,
    pub requests: Arc<dyn MatchRequestCommand>,
    pub requests_query: Arc<dyn MatchRequestQuery>,
    pub places: Arc<dyn PlaceTaggingCommand>,
    pub inbox: Arc<dyn NotificationInbox>,
    pub reminder_job: Arc<dyn ReminderJobTrigger>,
    pub default_match_radius_km: f64,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default match radius.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            matches,
            requests,
            requests_query,
            places,
            inbox,
            reminder_job,
        } = ports;
        Self {
            matches,
            requests,
            requests_query,
            places,
            inbox,
            reminder_job,
            default_match_radius_km: DEFAULT_MATCH_RADIUS_KM,
        }
    }

    /// Override the radius used when a match lookup omits one.
    #[must_use]
    pub fn with_default_match_radius_km(mut self, radius_km: f64) -> Self {
        self.default_match_radius_km = radius_km;
        self
    }
}
