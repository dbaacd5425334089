//! Headless engine binary for the Homestead farm simulation.
//!
//! Wires together configuration, the farmstead root, and the tick loop.
//! The engine advances the simulation at the configured tick interval,
//! auto-collects every producer that finishes a cycle, and logs stock and
//! coin summaries as it goes. Player-driven actions (crafting, selling,
//! upgrades) are left to an interactive frontend; this binary exists to
//! soak-test the production loop and to demonstrate the wiring.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `homestead-config.yaml` (or `$HOMESTEAD_CONFIG`)
//! 3. Build the farmstead from configuration
//! 4. Run the tick loop for the configured number of ticks
//! 5. Log the final farm state

mod error;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use homestead_core::{Farmstead, FarmsteadError, HomesteadConfig};
use homestead_ledger::LedgerError;
use homestead_types::Resource;

use crate::error::EngineError;

/// Ticks between periodic stock summaries in the log.
const SUMMARY_EVERY: u64 = 40;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration loading or farm construction fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("homestead-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        name = %config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "configuration loaded"
    );

    // 3. Build the farmstead.
    let mut farm = Farmstead::from_config(&config)?;

    // 4. Run the tick loop.
    let tick_interval = Duration::from_millis(config.world.tick_interval_ms);
    let delta = tick_interval.as_secs_f32();
    run_loop(&mut farm, config.world.max_ticks, tick_interval, delta)?;

    // 5. Final state.
    info!(
        ticks = farm.tick_count(),
        coins = farm.coins(),
        stored = farm.ledger().total(),
        capacity = farm.ledger().capacity(),
        "simulation finished"
    );
    for resource in Resource::ALL {
        let count = farm.ledger().count(resource);
        if count > 0 {
            info!(?resource, count, "final stock");
        }
    }

    Ok(())
}

/// Resolve and load the configuration file.
///
/// Falls back to the stock configuration when the file does not exist, so
/// the engine runs out of the box.
fn load_config() -> Result<HomesteadConfig, EngineError> {
    let path: PathBuf = std::env::var_os("HOMESTEAD_CONFIG")
        .map_or_else(|| PathBuf::from("homestead-config.yaml"), PathBuf::from);

    if path.exists() {
        info!(path = %path.display(), "loading configuration");
        Ok(HomesteadConfig::from_file(&path)?)
    } else {
        warn!(path = %path.display(), "config file not found, using stock configuration");
        Ok(HomesteadConfig::default())
    }
}

/// Drive the farm for `max_ticks` ticks, auto-collecting ready producers.
fn run_loop(
    farm: &mut Farmstead,
    max_ticks: u64,
    tick_interval: Duration,
    delta: f32,
) -> Result<(), EngineError> {
    for _ in 0..max_ticks {
        std::thread::sleep(tick_interval);

        let summary = farm.tick(delta)?;
        for ready in summary.ready {
            match farm.collect(ready.paddock, ready.producer) {
                Ok(Some(resource)) => {
                    info!(tick = summary.tick, ?resource, "collected");
                }
                Ok(None) => {}
                Err(FarmsteadError::Ledger {
                    source: LedgerError::CapacityExceeded { .. },
                }) => {
                    // The producer keeps holding its product; collection can
                    // be retried after stock is crafted away or sold.
                    warn!(
                        tick = summary.tick,
                        resource = ?ready.resource,
                        stored = farm.ledger().total(),
                        capacity = farm.ledger().capacity(),
                        "barn full, product left waiting"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        if summary.tick.is_multiple_of(SUMMARY_EVERY) {
            info!(
                tick = summary.tick,
                stored = farm.ledger().total(),
                capacity = farm.ledger().capacity(),
                coins = farm.coins(),
                "stock summary"
            );
        }
    }
    Ok(())
}
