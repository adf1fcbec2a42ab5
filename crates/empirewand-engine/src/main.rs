//! # Empire Wand Engine
//!
//! Standalone driver for the wave spell simulation.
//!
//! Loads the engine config (from the path given as the first argument, or
//! the platform config directory), then runs the arena demo on a fixed
//! tick loop. `--init` writes a default config file and exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod demo;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("empirewand=info".parse()?))
        .init();

    info!("Empire Wand starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match std::env::args().nth(1).as_deref() {
        Some("--init") => {
            EngineConfig::default().save_to(EngineConfig::config_path())?;
            return Ok(());
        },
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };
    config.validate();

    let report = demo::run(&config)?;
    info!(
        "{} casts, {} fizzled, {} events",
        report.casts, report.fizzled, report.events
    );

    info!("Empire Wand shutdown complete");
    Ok(())
}
