//! Headless scripted run of a level.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use taxiway_core::{Command, Event};
use taxiway_system_bootstrap::{FrameInput, Level, Session};
use taxiway_world::query;
use tracing::{debug, info};

/// Frame-by-frame instructions for a headless session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Script {
    pub(crate) ticks: u32,
    pub(crate) dt: Duration,
    pub(crate) launch_after: u32,
    pub(crate) rotate: Vec<usize>,
}

/// Outcome reported once the script finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) takeoffs: usize,
    pub(crate) crashes: usize,
    pub(crate) resets: usize,
    pub(crate) all_departed: bool,
}

/// Reads and validates a TOML level document.
pub(crate) fn load_level(path: &Path) -> Result<Level> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    Level::from_toml_str(&contents)
        .with_context(|| format!("failed to load level {}", path.display()))
}

/// Plays the level according to the script.
pub(crate) fn run(level: Level, script: &Script) -> Result<Summary> {
    let mut session = Session::new(level);

    for index in &script.rotate {
        let Some(craft) = query::roster(session.world()).get(*index).copied() else {
            bail!("no craft at roster index {index}");
        };
        session.submit(Command::RotateCraft { craft });
    }

    let mut crashes = 0;
    for tick in 0..script.ticks {
        let input = FrameInput {
            launch: tick == script.launch_after,
            ..FrameInput::default()
        };
        for event in session.step(script.dt, input) {
            match event {
                Event::CraftTookOff { craft } => info!(target: "taxiway.cli", tick, %craft, "departed"),
                Event::CraftCrashed { craft } => {
                    crashes += 1;
                    info!(target: "taxiway.cli", tick, %craft, "crashed");
                }
                Event::RotationRejected { craft, reason } => {
                    info!(target: "taxiway.cli", tick, %craft, %reason, "rotation rejected");
                }
                other => debug!(target: "taxiway.cli", tick, event = ?other),
            }
        }
    }

    Ok(Summary {
        takeoffs: session.takeoffs(),
        crashes,
        resets: session.resets(),
        all_departed: session.all_departed(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn demo_level() -> Level {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../levels/demo.toml");
        load_level(&path).expect("demo level should load")
    }

    fn script(ticks: u32, rotate: Vec<usize>) -> Script {
        Script {
            ticks,
            dt: Duration::from_millis(100),
            launch_after: 0,
            rotate,
        }
    }

    #[test]
    fn demo_level_departs_without_crashing() {
        let summary = run(demo_level(), &script(40, Vec::new())).expect("script runs");

        assert_eq!(
            summary,
            Summary {
                takeoffs: 3,
                crashes: 0,
                resets: 0,
                all_departed: true,
            }
        );
    }

    #[test]
    fn rotating_a_missing_craft_is_an_error() {
        let error = run(demo_level(), &script(1, vec![7])).expect_err("index 7 is out of range");
        assert!(error.to_string().contains("roster index 7"));
    }

    #[test]
    fn missing_level_file_names_the_path() {
        let error = load_level(Path::new("does/not/exist.toml")).expect_err("file is missing");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
