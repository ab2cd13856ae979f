//! Server binary for the Trophic simulation.
//!
//! This is the main entry point that wires the configuration, the grid
//! store, and the HTTP boundary together. The simulation has no background
//! tick loop: a client request is what advances it, so the server IS the
//! process.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `trophic-config.yaml` (defaults if absent)
//! 3. Create the grid store (random generator seeded from `world.seed`)
//! 4. Bind and serve until terminated

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use trophic_core::config::SimulationConfig;
use trophic_server::state::AppState;

/// Path of the deploy-time configuration file, relative to the working
/// directory.
const CONFIG_PATH: &str = "trophic-config.yaml";

/// Application entry point for the Trophic server.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the server cannot
/// bind its address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("trophic-server starting");

    // 2. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let config = if config_path.exists() {
        SimulationConfig::from_file(config_path)?
    } else {
        info!(path = CONFIG_PATH, "No config file found, using defaults");
        SimulationConfig::default()
    };
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        grid_size = config.world.grid_size,
        "Configuration loaded"
    );

    // 3. Create the grid store and shared state.
    let server_config = config.server.clone();
    let state = Arc::new(AppState::new(config));
    info!("Grid store initialized");

    // 4. Bind and serve.
    trophic_server::start_server(&server_config, state).await?;

    Ok(())
}
