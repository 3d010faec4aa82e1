//! Backend entry-point: loads settings, seeds the store and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::info;

use pawmate::config::PawmateSettings;
use pawmate::domain::geo::RandomJitter;
use pawmate::engine::{Engine, EngineDeps, notifier_from_settings};
use pawmate::inbound::http::health::HealthState;
use pawmate::outbound::seed::open_store;
use pawmate::telemetry;

use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    telemetry::init();

    let settings = PawmateSettings::load().wrap_err("failed to load settings")?;
    let bind_addr = settings.bind_addr()?;
    let store = open_store(&settings.database_path(), settings.seed_path.as_deref())?;

    let engine = Engine::assemble(EngineDeps {
        store: Arc::new(store),
        notifier: notifier_from_settings(&settings)?,
        clock: Arc::new(DefaultClock),
        jitter: Arc::new(RandomJitter::new(settings.jitter_km()?)),
    });
    engine.rebuild_indexes().await?;

    let http_state = engine
        .http_state()
        .with_default_match_radius_km(settings.match_radius_km()?);
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr, http_state))?;

    info!(%bind_addr, "pawmate listening");
    server.await?;
    Ok(())
}
