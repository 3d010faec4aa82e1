//! Assembly of domain services over tree-backed repositories.
//!
//! Both binaries and the behaviour suites build the engine here so every
//! entry point shares one wiring of ports to adapters.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::config::{PawmateSettings, SettingsError};
use crate::domain::geo::LocationJitter;
use crate::domain::ports::{Notifier, TreeStore, UserRepositoryError};
use crate::domain::{
    MatchRequestService, MatchService, NotificationDispatcher, NotificationInboxService,
    PlaceTaggingService, ReminderJob, ReminderScheduler,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::notifier::{LoggingNotifier, WebhookNotifier};
use crate::outbound::persistence::{
    TreeMatchRequestRepository, TreeNotificationRepository, TreePetRepository,
    TreePlaceRepository, TreeReminderMarkerRepository, TreeUserRepository,
};

/// Errors raised while choosing adapters from settings.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build notifier HTTP client: {0}")]
    NotifierClient(#[from] reqwest::Error),
}

/// Collaborators the engine is built from.
#[derive(Clone)]
pub struct EngineDeps {
    pub store: Arc<dyn TreeStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub jitter: Arc<dyn LocationJitter>,
}

/// Every use case, ready to hand to an inbound adapter.
#[derive(Clone)]
pub struct Engine {
    pub matches: Arc<MatchService<TreePetRepository>>,
    pub requests: Arc<MatchRequestService<TreeMatchRequestRepository>>,
    pub places: Arc<PlaceTaggingService>,
    pub inbox: Arc<NotificationInboxService<TreeNotificationRepository>>,
    pub reminder_job: Arc<ReminderJob>,
    users: Arc<TreeUserRepository>,
}

impl Engine {
    /// Wire repositories over `deps.store` into the domain services.
    pub fn assemble(deps: EngineDeps) -> Self {
        let EngineDeps {
            store,
            notifier,
            clock,
            jitter,
        } = deps;

        let users = Arc::new(TreeUserRepository::new(store.clone()));
        let user_index = users.clone();
        let pets = Arc::new(TreePetRepository::new(store.clone()));
        let notifications = Arc::new(TreeNotificationRepository::new(store.clone()));
        let dispatcher = NotificationDispatcher::new(
            notifications.clone(),
            users.clone(),
            notifier,
            clock.clone(),
        );

        let scheduler = ReminderScheduler::new(
            users.clone(),
            pets.clone(),
            Arc::new(TreeReminderMarkerRepository::new(store.clone())),
            dispatcher.clone(),
            clock.clone(),
        );

        Self {
            matches: Arc::new(MatchService::new(pets, jitter)),
            requests: Arc::new(MatchRequestService::new(
                Arc::new(TreeMatchRequestRepository::new(store.clone())),
                dispatcher.clone(),
                clock.clone(),
            )),
            places: Arc::new(PlaceTaggingService::new(
                Arc::new(TreePlaceRepository::new(store)),
                users,
                dispatcher,
                clock.clone(),
            )),
            inbox: Arc::new(NotificationInboxService::new(notifications)),
            reminder_job: Arc::new(ReminderJob::new(scheduler, clock)),
            users: user_index,
        }
    }

    /// Rebuild derived indexes after the store was loaded from a snapshot.
    pub async fn rebuild_indexes(&self) -> Result<usize, UserRepositoryError> {
        let indexed = self.users.rebuild_cell_index().await?;
        info!(indexed, "user cell index rebuilt");
        Ok(indexed)
    }

    /// Ports bundle for the HTTP adapter.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(HttpStatePorts {
            matches: self.matches.clone(),
            requests: self.requests.clone(),
            requests_query: self.requests.clone(),
            places: self.places.clone(),
            inbox: self.inbox.clone(),
            reminder_job: self.reminder_job.clone(),
        })
    }
}

/// Relay-backed notifier when a URL is configured, log-only otherwise.
pub fn notifier_from_settings(
    settings: &PawmateSettings,
) -> Result<Arc<dyn Notifier>, EngineError> {
    match settings.notifier_url()? {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "delivering notifications through relay");
            Ok(Arc::new(WebhookNotifier::new(
                endpoint,
                settings.notifier_timeout(),
            )?))
        }
        None => {
            info!("no notifier URL configured; deliveries are only logged");
            Ok(Arc::new(LoggingNotifier))
        }
    }
}
