#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Taxiway.
//!
//! The world owns the grid, the occupancy table, every craft and the fleet
//! roster. Nothing outside this crate mutates them: adapters and systems
//! submit [`Command`] values through [`apply`] and observe the resulting
//! [`Event`] stream plus the read-only [`query`] module.

mod craft;
mod fitter;
mod fleet;
mod obstacles;
mod occupancy;
mod placement;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use taxiway_core::{
    CellCoord, Command, CraftId, CraftSpec, Event, FlightTuning, GridFit, GridSpace,
    ObstacleField, Rotation,
};
use tracing::{debug, info, warn};

use crate::{
    craft::{Craft, Milestone},
    fleet::Fleet,
    occupancy::OccupancyTable,
    placement::DragOrigin,
};

pub use fitter::fit_grid;
pub use obstacles::StaticObstacles;

/// Represents the authoritative Taxiway world state.
#[derive(Debug)]
pub struct World {
    grid: GridSpace,
    occupancy: OccupancyTable,
    obstacles: Box<dyn ObstacleField>,
    crafts: BTreeMap<CraftId, Craft>,
    fleet: Fleet,
    drag: Option<DragOrigin>,
    tuning: FlightTuning,
    next_craft_id: u32,
}

impl World {
    /// Creates an empty world backed by the provided obstacle colliders.
    ///
    /// The grid stays unusable until a [`Command::ConfigureGrid`] succeeds.
    #[must_use]
    pub fn new(obstacles: Box<dyn ObstacleField>) -> Self {
        Self::with_tuning(obstacles, FlightTuning::default())
    }

    /// Creates an empty world with explicit animation tuning.
    #[must_use]
    pub fn with_tuning(obstacles: Box<dyn ObstacleField>, tuning: FlightTuning) -> Self {
        Self {
            grid: GridSpace::unusable(),
            occupancy: OccupancyTable::new(0, 0),
            obstacles,
            crafts: BTreeMap::new(),
            fleet: Fleet::new(),
            drag: None,
            tuning,
            next_craft_id: 0,
        }
    }

    fn configure_grid(&mut self, request: &GridFit, out_events: &mut Vec<Event>) {
        self.drag = None;
        for craft in self.crafts.values_mut() {
            craft.anchor = None;
        }

        match fit_grid(request) {
            Ok(grid) => {
                self.grid = grid;
                self.occupancy = OccupancyTable::new(grid.width(), grid.height());
                let blocked_cells =
                    fitter::mark_obstacles(&grid, self.obstacles.as_ref(), &mut self.occupancy);
                info!(
                    target: "taxiway.grid",
                    width = grid.width(),
                    height = grid.height(),
                    cell_size = grid.cell_size(),
                    blocked_cells,
                    "grid configured"
                );
                out_events.push(Event::GridConfigured {
                    grid,
                    blocked_cells,
                });
            }
            Err(reason) => {
                self.grid = GridSpace::unusable();
                self.occupancy = OccupancyTable::new(0, 0);
                warn!(target: "taxiway.grid", %reason, "grid configuration rejected");
                out_events.push(Event::GridRejected { reason });
            }
        }
    }

    fn spawn_craft(
        &mut self,
        spec: CraftSpec,
        cell: CellCoord,
        rotation: Rotation,
        depth: f32,
        out_events: &mut Vec<Event>,
    ) {
        let id = CraftId::new(self.next_craft_id);
        self.next_craft_id = self.next_craft_id.saturating_add(1);

        let position = self.grid.world_position(cell).extend(depth);
        let mut craft = Craft::new(id, spec, rotation, position);
        let occupied = match self.occupancy.occupy(id, craft.footprint(), cell) {
            Ok(()) => {
                craft.settle(cell, &self.grid);
                true
            }
            Err(reason) => {
                warn!(target: "taxiway.placement", craft = %id, ?cell, %reason, "spawned craft owns no cells");
                false
            }
        };

        let _ = self.crafts.insert(id, craft);
        self.fleet.enlist(id);
        out_events.push(Event::CraftSpawned {
            craft: id,
            cell,
            rotation,
            occupied,
        });
    }

    fn despawn_craft(&mut self, craft: CraftId, out_events: &mut Vec<Event>) {
        if self.crafts.remove(&craft).is_none() {
            debug!(target: "taxiway.fleet", %craft, "despawn ignored for missing craft");
            return;
        }
        let _ = self.occupancy.release(craft);
        self.fleet.discharge(craft);
        if self.is_dragging(craft) {
            self.drag = None;
        }
        out_events.push(Event::CraftDespawned { craft });
    }

    fn purge_dangling_ownership(&mut self, out_events: &mut Vec<Event>) {
        let dangling: Vec<CraftId> = self
            .occupancy
            .owners()
            .filter(|owner| !self.crafts.contains_key(owner))
            .collect();
        if dangling.is_empty() {
            return;
        }
        for craft in &dangling {
            let _ = self.occupancy.release(*craft);
        }
        warn!(target: "taxiway.fleet", count = dangling.len(), "purged dangling ownership");
        out_events.push(Event::OwnershipPurged { crafts: dangling });
    }

    fn start_fleet(&mut self, out_events: &mut Vec<Event>) {
        if let Some(pending) = self.drag.as_ref().map(|drag| drag.craft) {
            self.commit_drag(pending, out_events);
        }
        if self.fleet.end_pre_flight() {
            info!(target: "taxiway.fleet", roster = self.fleet.roster().len(), "pre-flight ended");
            out_events.push(Event::PreFlightEnded);
        }

        for id in self.fleet.roster().to_vec() {
            let Some(craft) = self.crafts.get_mut(&id) else {
                continue;
            };
            if let Some(heading) = craft.start_rolling() {
                out_events.push(Event::CraftRolling { craft: id, heading });
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        for id in self.fleet.roster().to_vec() {
            let Some(craft) = self.crafts.get_mut(&id) else {
                continue;
            };
            match craft.advance(dt, &self.tuning) {
                None => {}
                Some(Milestone::TakingOff) => {
                    out_events.push(Event::CraftTakingOff { craft: id });
                }
                Some(Milestone::TookOff) => {
                    self.remove_finished(id);
                    info!(target: "taxiway.fleet", craft = %id, "took off");
                    out_events.push(Event::CraftTookOff { craft: id });
                }
                Some(Milestone::Crashed { request_reset }) => {
                    self.remove_finished(id);
                    info!(target: "taxiway.fleet", craft = %id, request_reset, "crashed");
                    out_events.push(Event::CraftCrashed { craft: id });
                    if request_reset {
                        out_events.push(Event::ResetRequested {
                            delay: self.tuning.restart_delay,
                        });
                    }
                }
            }
        }

        self.detect_contacts(out_events);
    }

    /// Releases the cells of a craft whose animation finished and destroys it.
    ///
    /// The roster keeps the stale identifier; the start signal skips it.
    fn remove_finished(&mut self, craft: CraftId) {
        let _ = self.occupancy.release(craft);
        let _ = self.crafts.remove(&craft);
    }

    fn detect_contacts(&mut self, out_events: &mut Vec<Event>) {
        if self.fleet.is_pre_flight() {
            return;
        }

        let colliders: Vec<_> = self
            .fleet
            .roster()
            .iter()
            .filter_map(|id| {
                let craft = self.crafts.get(id)?;
                craft.collider(&self.grid).map(|collider| (*id, collider))
            })
            .collect();

        for (index, (first, first_box)) in colliders.iter().enumerate() {
            for (second, second_box) in &colliders[index + 1..] {
                if first_box.overlaps(second_box) {
                    self.resolve_contact(*first, *second, out_events);
                }
            }
        }
    }

    /// Puts both craft of a newly overlapping pair into their crash sequence.
    ///
    /// `first` is the side whose overlap fired first and carries the restart
    /// trigger. Knockback directions are exact opposites.
    fn resolve_contact(&mut self, first: CraftId, second: CraftId, out_events: &mut Vec<Event>) {
        if self.fleet.is_pre_flight() || first == second {
            return;
        }
        let (Some(a), Some(b)) = (self.crafts.get(&first), self.crafts.get(&second)) else {
            return;
        };
        if a.collider(&self.grid).is_none() || b.collider(&self.grid).is_none() {
            return;
        }

        let away_from_second = (a.position - b.position).truncate().normalize_or_zero();
        info!(target: "taxiway.fleet", %first, %second, "craft collided");
        self.crash(first, away_from_second, true, out_events);
        self.crash(second, -away_from_second, false, out_events);
    }

    fn crash(&mut self, craft: CraftId, away: Vec2, request_reset: bool, out_events: &mut Vec<Event>) {
        let Some(entry) = self.crafts.get_mut(&craft) else {
            return;
        };
        if entry.begin_crash(away, request_reset) {
            if self.is_dragging(craft) {
                self.drag = None;
            }
            out_events.push(Event::CraftCrashing { craft, away });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid(request) => world.configure_grid(&request, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnCraft {
            spec,
            cell,
            rotation,
            depth,
        } => world.spawn_craft(spec, cell, rotation, depth, out_events),
        Command::DespawnCraft { craft } => world.despawn_craft(craft, out_events),
        Command::PurgeDanglingOwnership => world.purge_dangling_ownership(out_events),
        Command::BeginDrag { craft } => world.begin_drag(craft, out_events),
        Command::DragCraft { craft, position } => world.drag_craft(craft, position, out_events),
        Command::CommitDrag { craft } => world.commit_drag(craft, out_events),
        Command::RotateCraft { craft } => world.rotate_craft(craft, out_events),
        Command::ReturnToHangar { craft } => world.return_to_hangar(craft, out_events),
        Command::StartFleet => world.start_fleet(out_events),
        Command::ReportContact { first, second } => {
            world.resolve_contact(first, second, out_events);
        }
        Command::CrashCraft {
            craft,
            away,
            request_reset,
        } => world.crash(craft, away, request_reset, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use taxiway_core::{
        CellCoord, CraftId, CraftSnapshot, CraftSpec, CraftView, FlightTuning, Footprint,
        GridSpace, PlacementError, Rotation,
    };

    use super::World;

    /// Provides the current grid space.
    #[must_use]
    pub fn grid_space(world: &World) -> GridSpace {
        world.grid
    }

    /// Reports whether the world is still in its pre-flight phase.
    #[must_use]
    pub fn is_pre_flight(world: &World) -> bool {
        world.fleet.is_pre_flight()
    }

    /// Animation tuning in effect.
    #[must_use]
    pub fn tuning(world: &World) -> FlightTuning {
        world.tuning
    }

    /// Craft currently lifted by an unresolved drag.
    #[must_use]
    pub fn dragged_craft(world: &World) -> Option<CraftId> {
        world.drag.as_ref().map(|drag| drag.craft)
    }

    /// Roster in order, including identifiers of craft that already left.
    #[must_use]
    pub fn roster(world: &World) -> &[CraftId] {
        world.fleet.roster()
    }

    /// Evaluates whether a footprint may be placed at `origin`.
    ///
    /// Every covered cell must be in bounds, unoccupied and unblocked, and the
    /// footprint's world box must not overlap any obstacle collider.
    pub fn can_place(
        world: &World,
        spec: &CraftSpec,
        origin: CellCoord,
        rotation: Rotation,
    ) -> Result<(), PlacementError> {
        world.check_placement(Footprint::new(spec.footprint, rotation), origin)
    }

    /// Reports whether a cell is owned by a craft; out-of-bounds cells report `true`.
    #[must_use]
    pub fn is_cell_occupied(world: &World, cell: CellCoord) -> bool {
        world.occupancy.is_occupied(cell)
    }

    /// Reports whether a cell is an obstacle; out-of-bounds cells report `true`.
    #[must_use]
    pub fn is_cell_blocked(world: &World, cell: CellCoord) -> bool {
        world.occupancy.is_blocked(cell)
    }

    /// Number of cells currently owned by any craft.
    #[must_use]
    pub fn occupied_cell_count(world: &World) -> usize {
        world.occupancy.occupied_count()
    }

    /// Cells owned by the craft, empty when it owns none.
    #[must_use]
    pub fn owned_cells(world: &World, craft: CraftId) -> Vec<CellCoord> {
        world
            .occupancy
            .owned_cells(craft)
            .map(<[CellCoord]>::to_vec)
            .unwrap_or_default()
    }

    /// Identifiers with an ownership entry, including dangling ones.
    #[must_use]
    pub fn owners(world: &World) -> Vec<CraftId> {
        world.occupancy.owners().collect()
    }

    /// Topmost idle craft whose footprint contains the world point.
    #[must_use]
    pub fn craft_at(world: &World, point: Vec2) -> Option<CraftId> {
        world
            .fleet
            .roster()
            .iter()
            .rev()
            .filter_map(|id| world.crafts.get(id))
            .filter(|craft| craft.is_idle())
            .find(|craft| {
                craft.collider(&world.grid).map_or(false, |collider| {
                    point.cmpge(collider.min).all() && point.cmplt(collider.max).all()
                })
            })
            .map(|craft| craft.id)
    }

    /// Captures a snapshot of a single live craft.
    #[must_use]
    pub fn craft(world: &World, craft: CraftId) -> Option<CraftSnapshot> {
        world.crafts.get(&craft).map(|craft| CraftSnapshot {
            id: craft.id,
            spec: craft.spec,
            state: craft.state(),
            position: craft.position,
            pose: craft.pose,
            rotation: craft.rotation,
            cell: craft.cell(&world.grid),
            hangar: craft.hangar.map(|hangar| hangar.cell),
        })
    }

    /// Captures every live craft in roster order.
    #[must_use]
    pub fn craft_view(world: &World) -> CraftView {
        CraftView::from_snapshots(
            world
                .fleet
                .roster()
                .iter()
                .filter_map(|id| craft(world, *id))
                .collect(),
        )
    }
}
