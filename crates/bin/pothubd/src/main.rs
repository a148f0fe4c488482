//! # pothubd — pothub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize tracing, the `SQLite` pool, and migrations
//! - Construct the storage adapters and the MQTT client pair
//! - Construct application services, injecting ports at construction —
//!   the broker connection's lifecycle is owned here, not by the core
//! - Spawn the reply listener (and optionally the virtual sensor)
//! - Build the axum router, bind, and serve until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pothub_adapter_http_axum::router;
use pothub_adapter_http_axum::state::AppState;
use pothub_adapter_storage_sqlite_sqlx::{Config as DbConfig, SqlitePotStore, SqliteUserDirectory};
use pothub_adapter_virtual::VirtualSensor;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();
    let store = SqlitePotStore::new(pool.clone());
    let users = SqliteUserDirectory::new(pool);

    // Transport — the publisher goes into the services, the listener
    // feeds device replies back into them.
    let (publisher, reply_listener) = pothub_adapter_mqtt::connect(&config.mqtt);

    // Services + HTTP state
    let state = AppState::new(store, users, publisher);
    tokio::spawn(reply_listener.run(Arc::clone(&state.moisture_service)));

    if config.integrations.virtual_sensor_enabled {
        tracing::info!("starting virtual moisture sensor");
        tokio::spawn(VirtualSensor::new(config.mqtt.clone()).run());
    }

    let app = router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "pothubd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutting down");
}
