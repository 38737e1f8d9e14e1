//! # MirrorPost Indexer
//!
//! Replicates MirrorPost contract events into the cache store and serves the
//! cache over HTTP, validating every read against the contract.

use actix_web::{App, HttpServer, web};
use tokio::sync::watch;
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use background::ReplicationSupervisor;
use config::AppConfig;
use middleware::error::{json_config, query_config};
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting MirrorPost indexer on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;

    // Replication runs beside the HTTP server and stops with it.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let supervisor = ReplicationSupervisor::new(
        state.replicator.clone(),
        state.events.clone(),
        config.replication.restart_delay,
    );
    let replication = tokio::spawn(supervisor.run(shutdown_rx));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    let served = server.await;

    tracing::info!("HTTP server stopped, shutting down replication");
    let _ = shutdown_tx.send(true);
    if let Err(e) = replication.await {
        tracing::error!("Replication task panicked: {}", e);
    }

    served?;
    Ok(())
}
