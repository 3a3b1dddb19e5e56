//! Backend entry-point: loads settings, prepares the store and runs the
//! HTTP server.

mod server;

use std::future::Future;

use actix_web::web;
use mockable::DefaultEnv;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus_portal::inbound::http::health::HealthState;
use campus_portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
use campus_portal::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{
    ContactSettings, PortalSettings, ServerConfig, TwilioSettings, create_server, drain_on,
    load_settings,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let portal: PortalSettings = load_settings()?;
    let twilio: TwilioSettings = load_settings()?;
    let contacts: ContactSettings = load_settings()?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|err| std::io::Error::other(format!("session configuration: {err}")))?;

    let mut config = ServerConfig::new(session, portal.bind_addr()?)
        .with_twilio(twilio.credentials())
        .with_contacts(contacts.service_contacts());

    if let Some(database_url) = portal.database_url() {
        if portal.skip_migrations {
            info!("skipping database migrations");
        } else {
            run_pending_migrations(database_url)
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
        }
        let pool_config =
            PoolConfig::new(database_url).with_max_size(portal.database_max_connections());
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let shutdown = shutdown_signal()?;
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on(shutdown, health_state, server.handle()));
    info!("campus portal listening");
    server.await
}

/// Resolves on the first SIGTERM or SIGINT.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
    })
}
