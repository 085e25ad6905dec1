#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Taxiway engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.
//!
//! Footprint geometry and grid-space arithmetic live here as pure functions so
//! that the world, systems, and adapters agree on how cells map to world units.

use std::{fmt, time::Duration};

use glam::{IVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Tolerance applied when snapping world coordinates onto cell boundaries.
const CELL_EPSILON: f32 = 1e-4;

/// Tolerance applied before two boxes are considered overlapping.
const OVERLAP_EPSILON: f32 = 1e-4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Fits the grid to a world-space area, discarding all occupancy and
    /// re-marking obstacle cells.
    ConfigureGrid(GridFit),
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates a craft anchored at the provided cell and claims its footprint.
    SpawnCraft {
        /// Static description of the craft.
        spec: CraftSpec,
        /// Origin cell anchoring the craft's footprint.
        cell: CellCoord,
        /// Initial footprint rotation.
        rotation: Rotation,
        /// World-space depth preserved while the craft moves.
        depth: f32,
    },
    /// Destroys a craft, releasing every cell it owns.
    DespawnCraft {
        /// Identifier of the craft to destroy.
        craft: CraftId,
    },
    /// Releases ownership entries whose craft no longer exists.
    PurgeDanglingOwnership,
    /// Starts dragging a craft, releasing its cells for the validity preview.
    BeginDrag {
        /// Craft picked up by the pointer.
        craft: CraftId,
    },
    /// Moves a dragged craft to a new world position and previews the target cell.
    DragCraft {
        /// Craft being dragged.
        craft: CraftId,
        /// World position the craft follows, already offset by the grab point.
        position: Vec3,
    },
    /// Drops a dragged craft, committing the placement or rolling it back.
    CommitDrag {
        /// Craft being dropped.
        craft: CraftId,
    },
    /// Rotates a craft to the next quarter turn if the new footprint fits.
    RotateCraft {
        /// Craft to rotate.
        craft: CraftId,
    },
    /// Moves a craft back onto its recorded hangar cell.
    ReturnToHangar {
        /// Craft to recover.
        craft: CraftId,
    },
    /// Ends the pre-flight phase and starts every craft on the roster.
    StartFleet,
    /// Reports that two craft colliders started overlapping.
    ReportContact {
        /// Craft whose overlap callback fired first; it carries the restart trigger.
        first: CraftId,
        /// Other craft participating in the contact.
        second: CraftId,
    },
    /// Forces a craft into its crash sequence.
    CrashCraft {
        /// Craft that should crash.
        craft: CraftId,
        /// Direction of the knockback applied during the crash.
        away: Vec2,
        /// Whether completing the crash should request a world reset.
        request_reset: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was fitted to the configured area.
    GridConfigured {
        /// Resulting grid space.
        grid: GridSpace,
        /// Number of cells marked as blocked by obstacles.
        blocked_cells: usize,
    },
    /// Reports that the grid configuration was rejected; the grid is unusable.
    GridRejected {
        /// Reason the configuration failed.
        reason: GridError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a craft was created.
    CraftSpawned {
        /// Identifier allocated to the craft.
        craft: CraftId,
        /// Cell the craft was anchored at.
        cell: CellCoord,
        /// Rotation the craft was created with.
        rotation: Rotation,
        /// Whether the craft managed to claim its footprint.
        occupied: bool,
    },
    /// Confirms that a craft was destroyed on request.
    CraftDespawned {
        /// Identifier of the destroyed craft.
        craft: CraftId,
    },
    /// Reports that ownership entries for missing craft were released.
    OwnershipPurged {
        /// Craft identifiers whose cells were released.
        crafts: Vec<CraftId>,
    },
    /// Confirms that a craft was picked up.
    DragStarted {
        /// Craft being dragged.
        craft: CraftId,
        /// Cell the craft occupied when the drag began.
        from: CellCoord,
    },
    /// Reports the validity of the cell currently under a dragged craft.
    PlacementPreviewed {
        /// Craft being dragged.
        craft: CraftId,
        /// Candidate origin cell.
        cell: CellCoord,
        /// Whether the craft could be placed there.
        placeable: bool,
    },
    /// Confirms that a craft was committed to a new cell.
    CraftPlaced {
        /// Craft that was placed.
        craft: CraftId,
        /// Region of cells now owned by the craft.
        region: CellRect,
    },
    /// Reports that a placement was rejected and the craft rolled back.
    PlacementRejected {
        /// Craft whose placement failed.
        craft: CraftId,
        /// Cell that was requested.
        cell: CellCoord,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a craft rotated in place.
    CraftRotated {
        /// Craft that rotated.
        craft: CraftId,
        /// Rotation after the turn.
        rotation: Rotation,
    },
    /// Reports that a rotation did not fit and was reverted.
    RotationRejected {
        /// Craft whose rotation failed.
        craft: CraftId,
        /// Reason the rotated footprint was rejected.
        reason: PlacementError,
    },
    /// Confirms that a craft was moved back onto its hangar cell.
    CraftReturnedToHangar {
        /// Craft that returned.
        craft: CraftId,
        /// Hangar cell the craft now occupies.
        cell: CellCoord,
    },
    /// Announces that the pre-flight phase ended and collisions are live.
    PreFlightEnded,
    /// Confirms that a craft started rolling.
    CraftRolling {
        /// Craft that started rolling.
        craft: CraftId,
        /// Unit heading snapped to a cardinal axis.
        heading: Vec2,
    },
    /// Confirms that a craft covered its required distance and is taking off.
    CraftTakingOff {
        /// Craft taking off.
        craft: CraftId,
    },
    /// Confirms that a craft entered its crash sequence.
    CraftCrashing {
        /// Craft that is crashing.
        craft: CraftId,
        /// Knockback direction applied to the craft.
        away: Vec2,
    },
    /// Take-off notification emitted when a craft leaves the world.
    CraftTookOff {
        /// Craft that departed.
        craft: CraftId,
    },
    /// Crash notification emitted when a crash sequence completes.
    CraftCrashed {
        /// Craft that crashed.
        craft: CraftId,
    },
    /// Requests that the whole world be rebuilt after the provided delay.
    ResetRequested {
        /// Simulated time to wait before rebuilding.
        delay: Duration,
    },
}

/// Unique identifier assigned to a craft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CraftId(u32);

impl CraftId {
    /// Creates a new craft identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "craft#{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed: world positions left of or below the grid origin
/// map to negative cells, which every bounds check rejects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell displaced by whole-cell offsets.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellSize) -> Self {
        Self { origin, size }
    }

    /// Lower-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellSize {
        self.size
    }
}

/// Size of a footprint or [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSize {
    width: u32,
    height: u32,
}

impl CellSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size with width and height exchanged.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Discrete footprint orientation in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// A quarter turn.
    Deg90,
    /// A half turn.
    Deg180,
    /// Three quarter turns.
    Deg270,
}

impl Rotation {
    /// Every rotation in the order [`Rotation::next`] cycles through them.
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Normalises an arbitrary angle in degrees to the quarter turn at or below it.
    #[must_use]
    pub const fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) / 90 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Angle of the rotation in degrees.
    #[must_use]
    pub const fn degrees(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Next quarter turn, wrapping from 270° back to 0°.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// Previous quarter turn, wrapping from 0° to 270°.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg270,
            Self::Deg90 => Self::Deg0,
            Self::Deg180 => Self::Deg90,
            Self::Deg270 => Self::Deg180,
        }
    }

    /// Reports whether the footprint's width and height swap at this rotation.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        self.degrees() % 180 != 0
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        if degrees.rem_euclid(90) != 0 {
            return Err(format!("rotation {degrees} is not a multiple of 90 degrees"));
        }
        Ok(Self::from_degrees(degrees))
    }
}

/// Rectangular body of a craft expressed in cells at a given rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    size: CellSize,
    rotation: Rotation,
}

impl Footprint {
    /// Creates a footprint from its unrotated size and a rotation.
    #[must_use]
    pub const fn new(size: CellSize, rotation: Rotation) -> Self {
        Self { size, rotation }
    }

    /// Unrotated size of the footprint.
    #[must_use]
    pub const fn size(&self) -> CellSize {
        self.size
    }

    /// Rotation applied to the footprint.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Same footprint at a different rotation.
    #[must_use]
    pub const fn rotated_to(self, rotation: Rotation) -> Self {
        Self::new(self.size, rotation)
    }

    /// Dimensions actually covered on the grid after applying the rotation.
    #[must_use]
    pub const fn effective_size(&self) -> CellSize {
        if self.rotation.swaps_axes() {
            self.size.transposed()
        } else {
            self.size
        }
    }

    /// Cells covered when the footprint is anchored at `origin`, row by row.
    pub fn cells(&self, origin: CellCoord) -> impl Iterator<Item = CellCoord> {
        let size = self.effective_size();
        let width = i32::try_from(size.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(size.height()).unwrap_or(i32::MAX);
        (0..height).flat_map(move |dy| (0..width).map(move |dx| origin.offset(dx, dy)))
    }

    /// Cell rectangle covered when anchored at `origin`.
    #[must_use]
    pub const fn region(&self, origin: CellCoord) -> CellRect {
        CellRect::from_origin_and_size(origin, self.effective_size())
    }

    /// World-space box covered when anchored at `origin` on `grid`.
    #[must_use]
    pub fn world_box(&self, origin: CellCoord, grid: &GridSpace) -> WorldRect {
        let size = self.effective_size();
        let extents = Vec2::new(
            size.width() as f32 * grid.cell_size(),
            size.height() as f32 * grid.cell_size(),
        );
        let corner = grid.world_position(origin);
        WorldRect::from_center_size(corner + extents * 0.5, extents)
    }
}

/// Axis-aligned world-space rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    /// Corner with the smallest coordinates.
    pub min: Vec2,
    /// Corner with the largest coordinates.
    pub max: Vec2,
}

impl WorldRect {
    /// Creates a rectangle from two corners in any order.
    #[must_use]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a rectangle centred on `center` with the full `size`.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Full width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Reports whether the interiors of the two rectangles intersect.
    ///
    /// Rectangles that merely share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &WorldRect) -> bool {
        self.min.x < other.max.x - OVERLAP_EPSILON
            && other.min.x < self.max.x - OVERLAP_EPSILON
            && self.min.y < other.max.y - OVERLAP_EPSILON
            && other.min.y < self.max.y - OVERLAP_EPSILON
    }
}

/// Mapping between world coordinates and integer cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpace {
    origin: Vec2,
    cell_size: f32,
    width: u32,
    height: u32,
}

impl GridSpace {
    /// Creates a grid space from an origin corner, square cell size and dimensions.
    #[must_use]
    pub const fn new(origin: Vec2, cell_size: f32, width: u32, height: u32) -> Self {
        Self {
            origin,
            cell_size,
            width,
            height,
        }
    }

    /// Zero-sized grid that rejects every cell.
    #[must_use]
    pub const fn unusable() -> Self {
        Self::new(Vec2::ZERO, 1.0, 0, 0)
    }

    /// World coordinates of the corner of cell `[0, 0]`.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Side length of a square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the grid has at least one cell.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Reports whether the cell lies within `[0, width) × [0, height)`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        u32::try_from(cell.column()).map_or(false, |column| column < self.width)
            && u32::try_from(cell.row()).map_or(false, |row| row < self.height)
    }

    /// Cell containing the provided world point.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> CellCoord {
        let local = (point - self.origin) / self.cell_size;
        CellCoord::new(
            (local.x + CELL_EPSILON).floor() as i32,
            (local.y + CELL_EPSILON).floor() as i32,
        )
    }

    /// World position of the corner of the provided cell.
    #[must_use]
    pub fn world_position(&self, cell: CellCoord) -> Vec2 {
        self.origin + Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_size
    }

    /// World-space rectangle covered by the whole grid.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        let size = Vec2::new(self.width as f32, self.height as f32) * self.cell_size;
        WorldRect::from_corners(self.origin, self.origin + size)
    }

    /// In-bounds cells whose interior intersects the provided rectangle.
    #[must_use]
    pub fn covered_cells(&self, rect: &WorldRect) -> Vec<CellCoord> {
        if !self.is_usable() {
            return Vec::new();
        }

        let low = (rect.min - self.origin) / self.cell_size;
        let high = (rect.max - self.origin) / self.cell_size;
        let max_column = i32::try_from(self.width).unwrap_or(i32::MAX) - 1;
        let max_row = i32::try_from(self.height).unwrap_or(i32::MAX) - 1;

        let first_column = ((low.x + CELL_EPSILON).floor() as i32).max(0);
        let first_row = ((low.y + CELL_EPSILON).floor() as i32).max(0);
        let last_column = ((high.x - CELL_EPSILON).ceil() as i32 - 1).min(max_column);
        let last_row = ((high.y - CELL_EPSILON).ceil() as i32 - 1).min(max_row);

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                cells.push(CellCoord::new(column, row));
            }
        }
        cells
    }
}

/// Strategy used to derive cell size and dimensions from the grid area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FitMode {
    /// Fixed column and row counts; the cell size is the largest square that fits both axes.
    FixedCount {
        /// Number of columns to lay out.
        columns: u32,
        /// Number of rows to lay out.
        rows: u32,
    },
    /// Fixed square cell size; dimensions are as many whole cells as fit.
    FixedCellSize {
        /// Side length of each cell in world units.
        cell_size: f32,
    },
}

/// Everything the grid fitter needs to lay out the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridFit {
    /// World-space area the grid must fit inside; `None` is a setup fault.
    pub area: Option<WorldRect>,
    /// How cell size and dimensions are chosen.
    pub mode: FitMode,
    /// World-space offset added after centring.
    pub world_offset: Vec2,
    /// Whole-cell offset added after the world-space offset.
    pub cell_offset: IVec2,
}

impl GridFit {
    /// Creates a fit request without offsets.
    #[must_use]
    pub const fn new(area: WorldRect, mode: FitMode) -> Self {
        Self {
            area: Some(area),
            mode,
            world_offset: Vec2::ZERO,
            cell_offset: IVec2::ZERO,
        }
    }
}

/// Reasons the grid fitter refuses to build a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum GridError {
    /// No grid area was supplied.
    #[error("grid area is not configured")]
    MissingArea,
    /// A fixed-count fit requested zero columns or rows.
    #[error("grid must have at least one column and one row")]
    InvalidDimensions,
    /// A fixed-size fit requested a non-positive or non-finite cell size.
    #[error("cell size must be a positive finite number")]
    InvalidCellSize,
}

/// Reasons a placement, rotation, or drag step may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The grid has not been configured successfully.
    #[error("grid is not available")]
    GridUnavailable,
    /// Part of the footprint lies outside the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// Part of the footprint overlaps cells owned by another craft.
    #[error("footprint overlaps another craft")]
    Occupied,
    /// Part of the footprint covers a cell marked as an obstacle.
    #[error("footprint covers a blocked cell")]
    Blocked,
    /// The footprint box overlaps an obstacle collider.
    #[error("footprint overlaps an obstacle")]
    ObstacleOverlap,
    /// The craft is no longer idle and cannot be rearranged.
    #[error("craft is not idle")]
    NotIdle,
    /// No craft with the provided identifier exists.
    #[error("craft does not exist")]
    MissingCraft,
    /// The craft is not currently being dragged.
    #[error("craft is not being dragged")]
    NotDragging,
    /// The craft has never been placed successfully.
    #[error("craft has no hangar cell")]
    NoHangar,
}

/// Local axis along which a craft's nose points before rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardAxis {
    /// The nose points along local +X.
    #[default]
    Right,
    /// The nose points along local +Y.
    Up,
}

impl ForwardAxis {
    /// Unit heading for a craft rotated by `angle_degrees`, snapped to the
    /// nearest cardinal axis.
    #[must_use]
    pub fn heading(self, angle_degrees: f32) -> Vec2 {
        let angle = angle_degrees.to_radians();
        let forward = match self {
            Self::Right => Vec2::new(angle.cos(), angle.sin()),
            Self::Up => Vec2::new(-angle.sin(), angle.cos()),
        };
        snap_to_cardinal(forward)
    }
}

/// Snaps a direction to the dominant axis, preferring X on ties.
#[must_use]
pub fn snap_to_cardinal(direction: Vec2) -> Vec2 {
    if direction.x.abs() >= direction.y.abs() {
        Vec2::new(sign(direction.x), 0.0)
    } else {
        Vec2::new(0.0, sign(direction.y))
    }
}

fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Static description of a craft shared by spawning and snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftSpec {
    /// Unrotated footprint size in cells.
    pub footprint: CellSize,
    /// Distance the craft must roll before taking off, in world units.
    pub required_distance: f32,
    /// Rolling speed in world units per second.
    pub move_speed: f32,
    /// Local axis the craft's nose points along.
    pub forward_axis: ForwardAxis,
}

impl Default for CraftSpec {
    fn default() -> Self {
        Self {
            footprint: CellSize::new(2, 1),
            required_distance: 3.0,
            move_speed: 2.0,
            forward_axis: ForwardAxis::Right,
        }
    }
}

/// Lifecycle state of a craft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CraftState {
    /// Waiting in the setup area; may be dragged and rotated.
    Idle,
    /// Rolling along its heading towards take-off distance.
    Rolling,
    /// Banking and fading out after covering its distance.
    TakingOff,
    /// Spinning, shrinking and fading after a collision.
    Crashing,
    /// Gone from the world.
    Removed,
}

/// Presentation values driven by the motion state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CraftPose {
    /// Visual rotation around the depth axis in degrees.
    pub angle_degrees: f32,
    /// Opacity in the range `0.0..=1.0`.
    pub alpha: f32,
    /// Uniform scale factor relative to the spawned size.
    pub scale: f32,
}

impl CraftPose {
    /// Fully visible, unscaled pose at the provided angle.
    #[must_use]
    pub const fn at_angle(angle_degrees: f32) -> Self {
        Self {
            angle_degrees,
            alpha: 1.0,
            scale: 1.0,
        }
    }
}

/// Timing and amplitude parameters of the take-off and crash animations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Length of the take-off bank-and-fade flourish.
    #[serde(with = "seconds")]
    pub takeoff_duration: Duration,
    /// Peak bank angle during take-off, in degrees.
    pub bank_amplitude_degrees: f32,
    /// Length of the crash spin-and-fade sequence.
    #[serde(with = "seconds")]
    pub crash_duration: Duration,
    /// Full turns performed while crashing.
    pub crash_spins: f32,
    /// Initial knockback speed in world units per second.
    pub knockback_speed: f32,
    /// Fraction of the scale lost by the end of a crash.
    pub shrink_amount: f32,
    /// Delay between the restart-trigger crash completing and the world reset.
    #[serde(with = "seconds")]
    pub restart_delay: Duration,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            takeoff_duration: Duration::from_millis(1500),
            bank_amplitude_degrees: 10.0,
            crash_duration: Duration::from_millis(900),
            crash_spins: 2.0,
            knockback_speed: 2.0,
            shrink_amount: 0.4,
            restart_delay: Duration::from_secs(1),
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(value.as_secs_f32())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f32::deserialize(deserializer)?;
        Duration::try_from_secs_f32(seconds).map_err(serde::de::Error::custom)
    }
}

/// Spatial overlap queries against static obstacle colliders.
///
/// Implementations answer only for the obstacle category; craft colliders are
/// never reported.
pub trait ObstacleField: fmt::Debug {
    /// Reports whether any obstacle overlaps the box centred on `center` with full `size`.
    fn overlap_box(&self, center: Vec2, size: Vec2) -> bool;

    /// Returns the world bounds of every obstacle overlapping the box.
    fn overlap_box_all(&self, center: Vec2, size: Vec2) -> Vec<WorldRect>;
}

/// Immutable representation of a single craft's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CraftSnapshot {
    /// Unique identifier assigned to the craft.
    pub id: CraftId,
    /// Static description of the craft.
    pub spec: CraftSpec,
    /// Lifecycle state.
    pub state: CraftState,
    /// World position of the craft's anchor corner.
    pub position: Vec3,
    /// Presentation values.
    pub pose: CraftPose,
    /// Footprint rotation.
    pub rotation: Rotation,
    /// Cell the craft's anchor currently maps to.
    pub cell: CellCoord,
    /// First committed placement, if any.
    pub hangar: Option<CellCoord>,
}

/// Read-only snapshot describing every live craft in roster order.
#[derive(Clone, Debug, Default)]
pub struct CraftView {
    snapshots: Vec<CraftSnapshot>,
}

impl CraftView {
    /// Creates a new craft view from snapshots already in roster order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CraftSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &CraftSnapshot> {
        self.snapshots.iter()
    }

    /// Number of craft captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
