#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Taxiway level headlessly.

mod script;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::script::Script;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Taxiway session runner", long_about = None)]
struct Cli {
    /// Path to the TOML level description.
    #[arg(long)]
    level: PathBuf,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 300)]
    ticks: u32,
    /// Simulated milliseconds per frame.
    #[arg(long = "dt-ms", default_value_t = 100)]
    dt_ms: u64,
    /// Frame on which the control tower launches the fleet.
    #[arg(long, default_value_t = 0)]
    launch_after: u32,
    /// Roster index of a craft to turn a quarter before launch; repeatable.
    #[arg(long)]
    rotate: Vec<usize>,
}

impl Cli {
    fn script(&self) -> Script {
        Script {
            ticks: self.ticks,
            dt: Duration::from_millis(self.dt_ms),
            launch_after: self.launch_after,
            rotate: self.rotate.clone(),
        }
    }
}

/// Entry point for the Taxiway command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let level = script::load_level(&cli.level)?;
    let summary = script::run(level, &cli.script())?;

    println!(
        "takeoffs: {}, crashes: {}, resets: {}, all departed: {}",
        summary.takeoffs, summary.crashes, summary.resets, summary.all_departed
    );
    Ok(())
}
