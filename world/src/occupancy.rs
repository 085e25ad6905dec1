//! Dense per-cell occupancy and obstacle bookkeeping.

use std::collections::BTreeMap;

use taxiway_core::{CellCoord, CraftId, Footprint, PlacementError};

/// Two independent boolean layers over the grid plus the cells each craft owns.
///
/// `blocked` is written once per grid build; `occupied` follows craft
/// footprints. A cell may be both when a craft was force-placed onto an
/// obstacle.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyTable {
    columns: u32,
    rows: u32,
    blocked: Vec<bool>,
    occupied: Vec<bool>,
    owners: BTreeMap<CraftId, Vec<CellCoord>>,
}

impl OccupancyTable {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            blocked: vec![false; capacity],
            occupied: vec![false; capacity],
            owners: BTreeMap::new(),
        }
    }

    pub(crate) fn mark_blocked(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let was_blocked = self.blocked[index];
        self.blocked[index] = true;
        !was_blocked
    }

    /// Out-of-bounds cells report occupied.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(true, |index| self.occupied[index])
    }

    /// Out-of-bounds cells report blocked.
    pub(crate) fn is_blocked(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(true, |index| self.blocked[index])
    }

    /// Per-cell legality: in bounds, unoccupied and unblocked.
    pub(crate) fn check_cells(
        &self,
        footprint: Footprint,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        for cell in footprint.cells(origin) {
            let Some(index) = self.index(cell) else {
                return Err(PlacementError::OutOfBounds);
            };
            if self.occupied[index] {
                return Err(PlacementError::Occupied);
            }
            if self.blocked[index] {
                return Err(PlacementError::Blocked);
            }
        }
        Ok(())
    }

    /// Legality that ignores obstacles: in bounds and not owned by anyone.
    pub(crate) fn check_reachable(
        &self,
        footprint: Footprint,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        for cell in footprint.cells(origin) {
            let Some(index) = self.index(cell) else {
                return Err(PlacementError::OutOfBounds);
            };
            if self.occupied[index] {
                return Err(PlacementError::Occupied);
            }
        }
        Ok(())
    }

    /// Claims the footprint for `craft`, releasing its previous cells first.
    ///
    /// Every target cell must be in bounds and unblocked; cells owned by
    /// other craft are not rechecked. Nothing changes when the precondition
    /// fails.
    pub(crate) fn occupy(
        &mut self,
        craft: CraftId,
        footprint: Footprint,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        for cell in footprint.cells(origin) {
            if self.index(cell).is_none() {
                return Err(PlacementError::OutOfBounds);
            }
            if self.is_blocked(cell) {
                return Err(PlacementError::Blocked);
            }
        }
        self.claim(craft, footprint.cells(origin).collect());
        Ok(())
    }

    /// Like [`OccupancyTable::occupy`] but only requires the cells to be in bounds.
    pub(crate) fn force_occupy(
        &mut self,
        craft: CraftId,
        footprint: Footprint,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        if footprint.cells(origin).any(|cell| self.index(cell).is_none()) {
            return Err(PlacementError::OutOfBounds);
        }
        self.claim(craft, footprint.cells(origin).collect());
        Ok(())
    }

    /// Puts back a cell set previously returned by [`OccupancyTable::release`].
    pub(crate) fn reclaim(&mut self, craft: CraftId, cells: Vec<CellCoord>) {
        let cells = cells
            .into_iter()
            .filter(|cell| self.index(*cell).is_some())
            .collect();
        self.claim(craft, cells);
    }

    /// Clears every cell owned by `craft`, returning the released cells.
    pub(crate) fn release(&mut self, craft: CraftId) -> Option<Vec<CellCoord>> {
        let cells = self.owners.remove(&craft)?;
        for cell in &cells {
            if let Some(index) = self.index(*cell) {
                self.occupied[index] = false;
            }
        }
        Some(cells)
    }

    pub(crate) fn owned_cells(&self, craft: CraftId) -> Option<&[CellCoord]> {
        self.owners.get(&craft).map(Vec::as_slice)
    }

    pub(crate) fn owners(&self) -> impl Iterator<Item = CraftId> + '_ {
        self.owners.keys().copied()
    }

    pub(crate) fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|occupied| **occupied).count()
    }

    fn claim(&mut self, craft: CraftId, cells: Vec<CellCoord>) {
        let _ = self.release(craft);
        for cell in &cells {
            if let Some(index) = self.index(*cell) {
                self.occupied[index] = true;
            }
        }
        let _ = self.owners.insert(craft, cells);
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxiway_core::{CellSize, Rotation};

    fn footprint(width: u32, height: u32, rotation: Rotation) -> Footprint {
        Footprint::new(CellSize::new(width, height), rotation)
    }

    #[test]
    fn occupy_then_release_restores_the_table() {
        let mut table = OccupancyTable::new(4, 4);
        let craft = CraftId::new(1);
        let before = table.occupied.clone();

        table
            .occupy(craft, footprint(2, 1, Rotation::Deg0), CellCoord::new(1, 1))
            .expect("cells are free");
        assert_eq!(table.occupied_count(), 2);

        let released = table.release(craft).expect("craft owned cells");
        assert_eq!(released.len(), 2);
        assert_eq!(table.occupied, before);
        assert!(table.owned_cells(craft).is_none());
    }

    #[test]
    fn release_without_ownership_is_a_no_op() {
        let mut table = OccupancyTable::new(2, 2);
        assert!(table.release(CraftId::new(9)).is_none());
        assert_eq!(table.occupied_count(), 0);
    }

    #[test]
    fn occupy_moves_previous_cells() {
        let mut table = OccupancyTable::new(4, 4);
        let craft = CraftId::new(3);
        let shape = footprint(1, 1, Rotation::Deg0);

        table.occupy(craft, shape, CellCoord::new(0, 0)).expect("free");
        table.occupy(craft, shape, CellCoord::new(3, 3)).expect("free");

        assert!(!table.is_occupied(CellCoord::new(0, 0)));
        assert!(table.is_occupied(CellCoord::new(3, 3)));
        assert_eq!(table.owned_cells(craft), Some(&[CellCoord::new(3, 3)][..]));
    }

    #[test]
    fn occupy_refuses_blocked_or_out_of_bounds_cells() {
        let mut table = OccupancyTable::new(3, 3);
        let craft = CraftId::new(0);
        assert!(table.mark_blocked(CellCoord::new(1, 0)));

        assert_eq!(
            table.occupy(craft, footprint(2, 1, Rotation::Deg0), CellCoord::new(0, 0)),
            Err(PlacementError::Blocked)
        );
        assert_eq!(
            table.occupy(craft, footprint(2, 1, Rotation::Deg0), CellCoord::new(2, 2)),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(table.occupied_count(), 0);
    }

    #[test]
    fn force_occupy_allows_blocked_cells() {
        let mut table = OccupancyTable::new(3, 3);
        let craft = CraftId::new(0);
        let _ = table.mark_blocked(CellCoord::new(0, 0));

        table
            .force_occupy(craft, footprint(1, 1, Rotation::Deg0), CellCoord::new(0, 0))
            .expect("in bounds");

        assert!(table.is_blocked(CellCoord::new(0, 0)));
        assert!(table.is_occupied(CellCoord::new(0, 0)));
        assert_eq!(
            table.check_cells(footprint(1, 1, Rotation::Deg0), CellCoord::new(0, 0)),
            Err(PlacementError::Occupied)
        );
    }

    #[test]
    fn out_of_bounds_cells_fail_closed() {
        let table = OccupancyTable::new(2, 2);
        assert!(table.is_occupied(CellCoord::new(-1, 0)));
        assert!(table.is_blocked(CellCoord::new(0, 2)));
        assert!(!table.is_occupied(CellCoord::new(1, 1)));
    }

    #[test]
    fn check_reachable_ignores_obstacles_but_not_other_craft() {
        let mut table = OccupancyTable::new(3, 1);
        let _ = table.mark_blocked(CellCoord::new(0, 0));
        table
            .occupy(CraftId::new(1), footprint(1, 1, Rotation::Deg0), CellCoord::new(2, 0))
            .expect("free");

        let shape = footprint(2, 1, Rotation::Deg0);
        assert_eq!(table.check_reachable(shape, CellCoord::new(0, 0)), Ok(()));
        assert_eq!(
            table.check_reachable(shape, CellCoord::new(1, 0)),
            Err(PlacementError::Occupied)
        );
    }
}
