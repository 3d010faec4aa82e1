//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use pawmate::ApiDoc;

use pawmate::inbound::http;
use pawmate::inbound::http::health::{HealthState, live, ready};
use pawmate::inbound::http::state::HttpState;

/// Probes and API docs, registered next to the `/api/v1` and `/jobs` scopes.
fn configure_operational(cfg: &mut web::ServiceConfig) {
    cfg.service(ready).service(live);

    #[cfg(debug_assertions)]
    cfg.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}

/// Application factory for one worker: request logging around every route.
pub(crate) fn build_app(
    health: web::Data<HealthState>,
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Logger::default())
        .app_data(health)
        .app_data(state)
        .configure(http::configure)
        .configure(configure_operational)
}

/// Bind the HTTP server and flip the readiness probe to serving.
///
/// # Errors
/// Fails when the socket cannot be bound.
pub fn create_server(
    health: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let state = config.http_state;
    let factory_health = health.clone();
    let server = HttpServer::new(move || build_app(factory_health.clone(), state.clone()))
        .bind(config.bind_addr)?
        .run();

    health.mark_ready();
    Ok(server)
}
