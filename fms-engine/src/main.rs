/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use fms_engine::arena::Arena;
use fms_engine::config::EventConfigManager;
use fms_engine::store::{MemoryStore, Store};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Field management daemon for one robotics event.
///
/// Example:
///   fms-engine -c event.yaml --schedules-dir fms-engine/schedules
#[derive(Debug, Parser)]
#[command(
    name = "fms-engine",
    about = "Field management engine – playoff bracket, schedulers, rankings and field peripherals",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML event settings file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Directory holding the qualification schedule templates (overrides the settings file).
    #[arg(long = "schedules-dir")]
    schedules_dir: Option<PathBuf>,

    /// Drive the PLC I/O image from the built-in simulation instead of Modbus.
    #[arg(long = "simulate-plc", default_value_t = false)]
    simulate_plc: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("FMS engine starting up...");

    let cli = Cli::parse();
    info!(
        config        = ?cli.config,
        schedules_dir = ?cli.schedules_dir,
        simulate_plc  = cli.simulate_plc,
        "Configuration"
    );

    // ── Load event settings ───────────────────────────────────────────────────
    let mut config_manager = EventConfigManager::new();
    match &cli.config {
        Some(path) => {
            if let Err(e) = config_manager.load_from_file(path) {
                error!("Failed to load event settings: {:#}", e);
                process::exit(1);
            }
        }
        None => {
            warn!("No settings file provided, using default event settings");
        }
    }
    if let Some(dir) = &cli.schedules_dir {
        config_manager.set_schedules_dir(dir);
    }

    let settings = config_manager.settings().clone();
    info!(
        event = %settings.name,
        playoff_type = %settings.playoff_type,
        alliances = settings.num_playoff_alliances,
        schedules_dir = %settings.schedules_dir.display(),
        "Event settings"
    );

    // ── Store → bracket → peripherals ─────────────────────────────────────────
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let mut arena = match Arena::new(settings, store) {
        Ok(arena) => arena,
        Err(e) => {
            error!("Failed to set up arena: {}", e);
            process::exit(1);
        }
    };
    arena.start(cli.simulate_plc);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
    arena.shutdown().await;
}
