//! Declarative level descriptions loaded from TOML.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use taxiway_core::{CellCoord, CraftSpec, FitMode, FlightTuning, GridFit, Rotation, WorldRect};

/// Level format version understood by this build.
pub const SUPPORTED_LEVEL_VERSION: u32 = 1;

/// Errors raised while loading a level description.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// The document was not valid TOML or did not match the level schema.
    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),
    /// The document declared a version this build cannot read.
    #[error("unsupported level version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
        /// Version this build supports.
        expected: u32,
    },
    /// A rectangle had its minimum corner beyond its maximum corner.
    #[error("{what} has min corner {min} beyond max corner {max}")]
    InvertedRect {
        /// Which rectangle was malformed.
        what: String,
        /// Declared minimum corner.
        min: Vec2,
        /// Declared maximum corner.
        max: Vec2,
    },
}

/// Craft placed on the grid when the level starts fresh.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelCraft {
    /// Origin cell anchoring the craft's footprint.
    pub cell: CellCoord,
    /// Initial footprint rotation in degrees.
    #[serde(default)]
    pub rotation: Rotation,
    /// World-space depth of the sprite.
    #[serde(default)]
    pub depth: f32,
    /// Craft description; omitted fields take the stock values.
    #[serde(default)]
    pub spec: CraftSpec,
}

/// Complete description of a playable level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Format version, must equal [`SUPPORTED_LEVEL_VERSION`].
    pub version: u32,
    /// World rectangle the grid is fitted into; missing areas leave the grid unusable.
    #[serde(default)]
    pub area: Option<WorldRect>,
    /// Fit strategy for the grid.
    pub fit: FitMode,
    /// World-space shift applied after centring.
    #[serde(default)]
    pub world_offset: Vec2,
    /// Whole-cell shift applied after the world-space offset.
    #[serde(default)]
    pub cell_offset: IVec2,
    /// Static obstacle colliders.
    #[serde(default)]
    pub obstacles: Vec<WorldRect>,
    /// Initial craft placements.
    #[serde(default)]
    pub crafts: Vec<LevelCraft>,
    /// Animation tuning overrides.
    #[serde(default)]
    pub tuning: FlightTuning,
    /// Whether the control tower launches only once per world.
    #[serde(default = "single_use_by_default")]
    pub single_use_tower: bool,
}

fn single_use_by_default() -> bool {
    true
}

impl Level {
    /// Parses and validates a TOML level document.
    pub fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        let level: Self = toml::from_str(contents)?;
        level.validate()?;
        Ok(level)
    }

    /// Checks the version header and rectangle orientation.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.version != SUPPORTED_LEVEL_VERSION {
            return Err(LevelError::UnsupportedVersion {
                found: self.version,
                expected: SUPPORTED_LEVEL_VERSION,
            });
        }

        let rects = self
            .area
            .iter()
            .map(|area| ("area".to_owned(), area))
            .chain(
                self.obstacles
                    .iter()
                    .enumerate()
                    .map(|(index, obstacle)| (format!("obstacle {index}"), obstacle)),
            );
        for (what, rect) in rects {
            if rect.min.cmpgt(rect.max).any() {
                return Err(LevelError::InvertedRect {
                    what,
                    min: rect.min,
                    max: rect.max,
                });
            }
        }
        Ok(())
    }

    /// Grid fit request derived from the level.
    #[must_use]
    pub fn grid_fit(&self) -> GridFit {
        GridFit {
            area: self.area,
            mode: self.fit,
            world_offset: self.world_offset,
            cell_offset: self.cell_offset,
        }
    }
}
