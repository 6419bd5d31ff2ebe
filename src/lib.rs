//! Native bridge between a desktop shell and its embedded UI.
//!
//! Startup order: [`env`] resolves the process facts, [`config`] loads the
//! user profile, then the tray, lifecycle controller and HTTP bridge are
//! wired into one [`app::App`].

pub mod app;
pub mod config;
pub mod env;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod server;
pub mod shell;
pub mod storage;
pub mod tray;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use app::App;
use config::AppConfig;
use env::Environment;
use lifecycle::Lifecycle;
use shell::{EventBus, HeadlessShell, Shutdown, MAIN_WINDOW};
use tray::Tray;

const EVENT_CAPACITY: usize = 64;

/// Resolve the environment, load the profile and serve the bridge until
/// the application quits.
pub async fn run() -> Result<()> {
    let env = Arc::new(Environment::resolve().context("cannot locate the running executable")?);
    info!(
        "Starting {} from {} ({}/{}, x64 level {}, scheduled: {})",
        env.app_name,
        env.base_path.display(),
        env.os,
        env.arch,
        env.x64_level,
        env.from_task_sch
    );

    let config = Arc::new(AppConfig::load(&env));
    info!("Configuration loaded");

    let shell = Arc::new(HeadlessShell::new());
    shell.open_window(MAIN_WINDOW, &config);

    let events = EventBus::new(EVENT_CAPACITY);
    let mut ui_events = events.subscribe();
    tokio::spawn(async move {
        loop {
            match ui_events.recv().await {
                Ok(event) => info!("Event {} {}", event.name, event.data),
                Err(RecvError::Lagged(skipped)) => warn!("Event log skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let shutdown = Arc::new(Shutdown::new());
    let lifecycle = Lifecycle::new(Arc::clone(&env), shutdown.clone());

    let tray = Tray::new(
        Arc::clone(&env),
        shell.clone(),
        Arc::new(events),
        shell.clone(),
    );
    tray.init();

    let app = Arc::new(App::new(env, config, lifecycle, tray));

    let mut server = {
        let app = Arc::clone(&app);
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move { server::start_server(app, shutdown).await })
    };

    tokio::select! {
        result = &mut server => result??,
        _ = tokio::signal::ctrl_c() => {
            app.exit_app();
            server.await??;
        }
    }

    info!("Shutdown complete");
    Ok(())
}
