//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockMatchQuery, MockMatchRequestCommand, MockMatchRequestQuery, MockNotificationInbox,
    MockPlaceTaggingCommand, MockReminderJobTrigger,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Mocked driving ports; set expectations on the fields a test exercises and
/// leave the rest untouched.
#[derive(Default)]
pub struct MockPorts {
    pub matches: MockMatchQuery,
    pub requests: MockMatchRequestCommand,
    pub requests_query: MockMatchRequestQuery,
    pub places: MockPlaceTaggingCommand,
    pub inbox: MockNotificationInbox,
    pub reminder_job: MockReminderJobTrigger,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            matches: Arc::new(self.matches),
            requests: Arc::new(self.requests),
            requests_query: Arc::new(self.requests_query),
            places: Arc::new(self.places),
            inbox: Arc::new(self.inbox),
            reminder_job: Arc::new(self.reminder_job),
        })
    }
}

/// App exposing every routed handler over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(super::configure)
}
