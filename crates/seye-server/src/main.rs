//! Track feed binary for the S-EYE simulation.
//!
//! This is the main entry point that wires together the track store,
//! the simulation clock, and the HTTP/`WebSocket` server. It runs until
//! `Ctrl-C`, then stops accepting connections and halts the clock.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `seye-config.yaml` (or `$SEYE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared track store
//! 4. Create application state (subscriber registry, broadcast engine)
//! 5. Start the simulation clock
//! 6. Serve HTTP and `WebSocket` until shutdown
//! 7. Stop the clock and log the result

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use seye_core::clock::SimulationClock;
use seye_core::config::{LoggingConfig, SeyeConfig};
use seye_core::store::TrackStore;
use seye_observer::server::{ServerConfig, start_server};
use seye_observer::state::AppState;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "seye-config.yaml";

/// Application entry point for the track feed.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot
/// bind, or the clock task fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        port = config.server.port,
        tick_interval_ms = config.simulation.tick_interval_ms,
        seed = ?config.simulation.seed,
        "Configuration loaded"
    );

    // 3. Create the track store.
    let store = TrackStore::from_config(&config).into_shared();

    // 4. Create application state.
    let state = Arc::new(AppState::new(Arc::clone(&store), &config));

    // 5. Start the simulation clock.
    let clock = SimulationClock::from_settings(store, state.broadcaster(), &config.simulation)?;
    let (stop_tx, stop_rx) = watch::channel(false);
    let clock_task = clock.spawn(stop_rx);
    info!(period_ms = config.simulation.tick_interval_ms, "Simulation clock started");

    // 6. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    let served = start_server(&server_config, Arc::clone(&state), shutdown_signal()).await;

    // 7. Stop the clock whether or not serving succeeded.
    if stop_tx.send(true).is_err() {
        warn!("Simulation clock already stopped");
    }
    let summary = clock_task.await.map_err(|e| AppError::ClockTask {
        message: e.to_string(),
    })?;
    info!(
        ticks = summary.ticks,
        degraded_ticks = summary.degraded_ticks,
        "Simulation clock stopped"
    );

    served?;
    info!("seye-server shut down cleanly");
    Ok(())
}

/// Load configuration from `$SEYE_CONFIG` or `seye-config.yaml`.
///
/// A missing file is not an error: defaults are used, with the same
/// environment overrides applied as for a file.
fn load_config() -> Result<SeyeConfig, AppError> {
    let path = std::env::var("SEYE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        return Ok(SeyeConfig::from_file(&path)?);
    }

    let mut config = SeyeConfig::default();
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolve on `Ctrl-C`.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
    }
}
