//! Sensor Tree API Server
//!
//! Run with: cargo run --bin sensor-tree -- --config config.toml
//!
//! # Configuration
//!
//! Without `--config` the server looks in the default locations (see
//! [`Config::load_default`]). Environment variables:
//! - `SENSOR_TREE_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `SENSOR_TREE_API_PORT`: Port to listen on (default: 8080)
//! - `SENSOR_TREE_SEED_FILE`: JSON seed file (default: built-in dataset)
//! - `SENSOR_TREE_BROADCAST_INTERVAL_SECS`: Live update interval (default: 5)
//! - `SENSOR_TREE_LOG_LEVEL`, `SENSOR_TREE_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use anyhow::Context;
use clap::Parser;
use sensor_tree::api::{serve, AppState};
use sensor_tree::config::{Config, LoggingConfig};
use sensor_tree::store::{MemoryStore, NodeStore, SeedData};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sensor-tree")]
#[command(about = "Sensor tree API server", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting sensor tree server v{}", env!("CARGO_PKG_VERSION"));

    let seed = match &config.store.seed_file {
        Some(path) => {
            tracing::info!(seed_file = %path, "Loading seed data");
            SeedData::load(Path::new(path)).with_context(|| format!("loading seed file {}", path))?
        }
        None => SeedData::bootstrap(),
    };

    let store = Arc::new(MemoryStore::from_seed(seed).context("seeding store")?);
    let stats = store.stats()?;
    tracing::info!(nodes = stats.nodes, sensors = stats.sensors, "Store ready");

    let state = AppState::new(store, config.api.clone(), config.broadcaster.clone());
    let broadcaster = Arc::clone(&state.broadcaster);

    serve(state, &config.api).await?;

    tracing::info!("Stopping live update broadcaster");
    broadcaster.shutdown().await;
    tracing::info!("Sensor tree server stopped");

    Ok(())
}

/// Initialize the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("sensor_tree={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}
