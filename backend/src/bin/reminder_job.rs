//! Run one reminder pass and print the job envelope as JSON.
//!
//! Intended for an external daily scheduler. Opens the same database as the
//! server, so dedup markers written by one run suppress repeats in the next.
//! Exits non-zero when the run reports a failure status.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

use pawmate::config::PawmateSettings;
use pawmate::domain::geo::NoJitter;
use pawmate::domain::ports::ReminderJobTrigger;
use pawmate::engine::{Engine, EngineDeps, notifier_from_settings};
use pawmate::outbound::seed::open_store;
use pawmate::telemetry;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    telemetry::init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<ExitCode> {
    let settings = PawmateSettings::load().wrap_err("failed to load settings")?;
    let store = open_store(&settings.database_path(), settings.seed_path.as_deref())?;

    // Reminders never display locations, so no jitter is needed.
    let engine = Engine::assemble(EngineDeps {
        store: Arc::new(store),
        notifier: notifier_from_settings(&settings)?,
        clock: Arc::new(DefaultClock),
        jitter: Arc::new(NoJitter),
    });

    let response = engine.reminder_job.invoke().await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
