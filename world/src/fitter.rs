//! Grid fitting and obstacle marking.

use glam::Vec2;
use taxiway_core::{FitMode, GridError, GridFit, GridSpace, ObstacleField};

use crate::occupancy::OccupancyTable;

/// Computes the grid laid over the requested area.
///
/// The used area is centred inside the bounding rectangle, then shifted by
/// the world-space offset and finally by the whole-cell offset. Identical
/// requests always produce identical grids.
pub fn fit_grid(request: &GridFit) -> Result<GridSpace, GridError> {
    let area = request.area.ok_or(GridError::MissingArea)?;
    let size = area.size();

    let (cell_size, width, height) = match request.mode {
        FitMode::FixedCount { columns, rows } => {
            if columns == 0 || rows == 0 {
                return Err(GridError::InvalidDimensions);
            }
            let cell_size = (size.x / columns as f32).min(size.y / rows as f32);
            (cell_size, columns, rows)
        }
        FitMode::FixedCellSize { cell_size } => {
            if !cell_size.is_finite() || cell_size <= 0.0 {
                return Err(GridError::InvalidCellSize);
            }
            let width = (size.x / cell_size).floor().max(0.0) as u32;
            let height = (size.y / cell_size).floor().max(0.0) as u32;
            (cell_size, width, height)
        }
    };

    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(GridError::InvalidCellSize);
    }

    let used = Vec2::new(width as f32, height as f32) * cell_size;
    let padding = (size - used) * 0.5;
    let origin = area.min
        + padding
        + request.world_offset
        + request.cell_offset.as_vec2() * cell_size;

    Ok(GridSpace::new(origin, cell_size, width, height))
}

/// Marks every cell covered by an obstacle overlapping the grid.
///
/// Returns the number of cells newly marked as blocked.
pub(crate) fn mark_obstacles(
    grid: &GridSpace,
    obstacles: &dyn ObstacleField,
    table: &mut OccupancyTable,
) -> usize {
    if !grid.is_usable() {
        return 0;
    }

    let bounds = grid.bounds();
    let mut marked = 0;
    for obstacle in obstacles.overlap_box_all(bounds.center(), bounds.size()) {
        for cell in grid.covered_cells(&obstacle) {
            if table.mark_blocked(cell) {
                marked += 1;
            }
        }
    }
    marked
}
