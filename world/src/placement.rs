//! Drag, rotate and hangar-return interactions for idle craft.

use glam::Vec3;
use taxiway_core::{CellCoord, CraftId, Event, Footprint, PlacementError, Rotation};
use tracing::{debug, warn};

use crate::World;

/// Rollback information captured when a drag begins.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DragOrigin {
    pub(crate) craft: CraftId,
    position: Vec3,
    rotation: Rotation,
    cell: CellCoord,
    cells: Option<Vec<CellCoord>>,
}

impl World {
    /// Placement legality shared by drag preview, commit and rotation.
    pub(crate) fn check_placement(
        &self,
        footprint: Footprint,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        if !self.grid.is_usable() {
            return Err(PlacementError::GridUnavailable);
        }
        self.occupancy.check_cells(footprint, origin)?;

        let world_box = footprint.world_box(origin, &self.grid);
        if self
            .obstacles
            .overlap_box(world_box.center(), world_box.size())
        {
            return Err(PlacementError::ObstacleOverlap);
        }
        Ok(())
    }

    pub(crate) fn is_dragging(&self, craft: CraftId) -> bool {
        self.drag.as_ref().map_or(false, |drag| drag.craft == craft)
    }

    pub(crate) fn begin_drag(&mut self, craft: CraftId, out_events: &mut Vec<Event>) {
        if self.is_dragging(craft) {
            return;
        }
        if let Some(previous) = self.drag.as_ref().map(|drag| drag.craft) {
            self.commit_drag(previous, out_events);
        }

        let Some(entry) = self.crafts.get(&craft) else {
            debug!(target: "taxiway.placement", %craft, "drag ignored for missing craft");
            return;
        };
        let cell = entry.cell(&self.grid);
        if !entry.is_idle() {
            out_events.push(Event::PlacementRejected {
                craft,
                cell,
                reason: PlacementError::NotIdle,
            });
            return;
        }

        let position = entry.position;
        let rotation = entry.rotation;
        let cells = self.occupancy.release(craft);
        self.drag = Some(DragOrigin {
            craft,
            position,
            rotation,
            cell,
            cells,
        });
        debug!(target: "taxiway.placement", %craft, ?cell, "drag started");
        out_events.push(Event::DragStarted { craft, from: cell });
    }

    pub(crate) fn drag_craft(&mut self, craft: CraftId, position: Vec3, out_events: &mut Vec<Event>) {
        if !self.is_dragging(craft) {
            debug!(target: "taxiway.placement", %craft, "move ignored without an active drag");
            return;
        }
        let Some(entry) = self.crafts.get_mut(&craft) else {
            return;
        };
        entry.position = Vec3::new(position.x, position.y, entry.position.z);
        entry.anchor = None;

        let footprint = entry.footprint();
        let cell = self.grid.cell_at(position.truncate());
        let placeable = self.check_placement(footprint, cell).is_ok();
        out_events.push(Event::PlacementPreviewed {
            craft,
            cell,
            placeable,
        });
    }

    pub(crate) fn commit_drag(&mut self, craft: CraftId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.crafts.get(&craft) else {
            return;
        };
        if !self.is_dragging(craft) {
            out_events.push(Event::PlacementRejected {
                craft,
                cell: entry.cell(&self.grid),
                reason: PlacementError::NotDragging,
            });
            return;
        }

        let footprint = entry.footprint();
        let cell = self.grid.cell_at(entry.position.truncate());
        let outcome = self
            .check_placement(footprint, cell)
            .and_then(|()| self.occupancy.occupy(craft, footprint, cell));
        let Some(origin) = self.drag.take() else {
            return;
        };

        match outcome {
            Ok(()) => {
                if let Some(entry) = self.crafts.get_mut(&craft) {
                    entry.settle(cell, &self.grid);
                }
                debug!(target: "taxiway.placement", %craft, ?cell, "placement committed");
                out_events.push(Event::CraftPlaced {
                    craft,
                    region: footprint.region(cell),
                });
            }
            Err(reason) => {
                self.roll_back(origin);
                debug!(target: "taxiway.placement", %craft, ?cell, %reason, "placement rolled back");
                out_events.push(Event::PlacementRejected {
                    craft,
                    cell,
                    reason,
                });
            }
        }
    }

    /// Restores the pre-drag transform and the exact cells released at drag start.
    fn roll_back(&mut self, origin: DragOrigin) {
        let DragOrigin {
            craft,
            position,
            rotation,
            cell,
            cells,
        } = origin;
        let Some(entry) = self.crafts.get_mut(&craft) else {
            return;
        };
        entry.position = position;
        entry.turn_to(rotation);

        match cells {
            Some(cells) => {
                self.occupancy.reclaim(craft, cells);
                entry.anchor = Some(cell);
            }
            None => {
                let footprint = entry.footprint();
                match self.occupancy.occupy(craft, footprint, cell) {
                    Ok(()) => entry.settle(cell, &self.grid),
                    Err(reason) => {
                        warn!(target: "taxiway.placement", %craft, ?cell, %reason, "rollback left craft without cells");
                    }
                }
            }
        }
    }

    pub(crate) fn rotate_craft(&mut self, craft: CraftId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.crafts.get(&craft) else {
            out_events.push(Event::RotationRejected {
                craft,
                reason: PlacementError::MissingCraft,
            });
            return;
        };
        if !entry.is_idle() {
            out_events.push(Event::RotationRejected {
                craft,
                reason: PlacementError::NotIdle,
            });
            return;
        }

        let rotation = entry.rotation.next();
        let turned = entry.footprint().rotated_to(rotation);

        if self.is_dragging(craft) {
            let cell = self.grid.cell_at(entry.position.truncate());
            let placeable = self.check_placement(turned, cell).is_ok();
            if let Some(entry) = self.crafts.get_mut(&craft) {
                entry.turn_to(rotation);
            }
            out_events.push(Event::CraftRotated { craft, rotation });
            out_events.push(Event::PlacementPreviewed {
                craft,
                cell,
                placeable,
            });
            return;
        }

        let cell = entry.cell(&self.grid);
        let released = self.occupancy.release(craft);
        let outcome = self
            .check_placement(turned, cell)
            .and_then(|()| self.occupancy.occupy(craft, turned, cell));

        match outcome {
            Ok(()) => {
                if let Some(entry) = self.crafts.get_mut(&craft) {
                    entry.turn_to(rotation);
                    entry.settle(cell, &self.grid);
                }
                debug!(target: "taxiway.placement", %craft, degrees = rotation.degrees(), "rotated");
                out_events.push(Event::CraftRotated { craft, rotation });
            }
            Err(reason) => {
                if let Some(cells) = released {
                    self.occupancy.reclaim(craft, cells);
                }
                debug!(target: "taxiway.placement", %craft, %reason, "rotation reverted");
                out_events.push(Event::RotationRejected { craft, reason });
            }
        }
    }

    pub(crate) fn return_to_hangar(&mut self, craft: CraftId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.crafts.get(&craft) else {
            return;
        };
        let cell = entry.cell(&self.grid);
        if !entry.is_idle() {
            out_events.push(Event::PlacementRejected {
                craft,
                cell,
                reason: PlacementError::NotIdle,
            });
            return;
        }
        let Some(hangar) = entry.hangar else {
            out_events.push(Event::PlacementRejected {
                craft,
                cell,
                reason: PlacementError::NoHangar,
            });
            return;
        };

        let footprint = Footprint::new(entry.spec.footprint, hangar.rotation);
        if self.is_dragging(craft) {
            if let Some(origin) = self.drag.take() {
                self.roll_back(origin);
            }
        }

        let released = self.occupancy.release(craft);
        let outcome = if self.grid.is_usable() {
            self.occupancy
                .check_reachable(footprint, hangar.cell)
                .and_then(|()| self.occupancy.force_occupy(craft, footprint, hangar.cell))
        } else {
            Err(PlacementError::GridUnavailable)
        };

        match outcome {
            Ok(()) => {
                if let Some(entry) = self.crafts.get_mut(&craft) {
                    entry.turn_to(hangar.rotation);
                    entry.settle(hangar.cell, &self.grid);
                }
                debug!(target: "taxiway.placement", %craft, cell = ?hangar.cell, "returned to hangar");
                out_events.push(Event::CraftReturnedToHangar {
                    craft,
                    cell: hangar.cell,
                });
            }
            Err(reason) => {
                if let Some(cells) = released {
                    self.occupancy.reclaim(craft, cells);
                }
                out_events.push(Event::PlacementRejected {
                    craft,
                    cell: hangar.cell,
                    reason,
                });
            }
        }
    }
}
