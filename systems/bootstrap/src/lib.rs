#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that builds playable worlds from level descriptions and
//! drives a session across crash-triggered resets.

mod level;

use std::time::Duration;

use taxiway_core::{Command, Event};
use taxiway_system_control_tower::ControlTower;
use taxiway_system_hangar::{Hangar, HangarInput};
use taxiway_system_preflight::PreFlightStore;
use taxiway_world::{apply, query, StaticObstacles, World};
use tracing::info;

pub use level::{Level, LevelCraft, LevelError, SUPPORTED_LEVEL_VERSION};

/// Builds a fresh world for the level and fits its grid.
///
/// Craft are not spawned; the caller decides between the level's initial
/// placements and a pending snapshot restore.
pub fn build_world(level: &Level, out_events: &mut Vec<Event>) -> World {
    let obstacles = StaticObstacles::new(level.obstacles.clone());
    let mut world = World::with_tuning(Box::new(obstacles), level.tuning);
    apply(
        &mut world,
        Command::ConfigureGrid(level.grid_fit()),
        out_events,
    );
    world
}

/// Player intent gathered by the adapter for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer and key input for arranging craft.
    pub hangar: HangarInput,
    /// Indicates whether the player pressed the launch control.
    pub launch: bool,
}

/// A play session: one level, the world currently built from it and the
/// systems that survive world resets.
#[derive(Debug)]
pub struct Session {
    level: Level,
    world: World,
    store: PreFlightStore,
    tower: ControlTower,
    hangar: Hangar,
    events: Vec<Event>,
    takeoffs: usize,
    resets: usize,
}

impl Session {
    /// Starts a session with the level's initial placements.
    #[must_use]
    pub fn new(level: Level) -> Self {
        let mut events = Vec::new();
        let world = build_world(&level, &mut events);
        let tower = ControlTower::new(level.single_use_tower);
        let mut session = Self {
            level,
            world,
            store: PreFlightStore::new(),
            tower,
            hangar: Hangar::new(),
            events,
            takeoffs: 0,
            resets: 0,
        };
        session.populate();
        session
    }

    /// World currently in play.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Snapshot store shared across resets.
    #[must_use]
    pub fn store(&self) -> &PreFlightStore {
        &self.store
    }

    /// Events produced since the systems last ran.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Take-off notifications observed since the current world was built.
    #[must_use]
    pub fn takeoffs(&self) -> usize {
        self.takeoffs
    }

    /// Number of world resets performed so far.
    #[must_use]
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Reports whether every craft of the current world has taken off.
    #[must_use]
    pub fn all_departed(&self) -> bool {
        let roster = query::roster(&self.world).len();
        roster > 0 && self.takeoffs >= roster
    }

    /// Applies a command directly, bypassing the interaction systems.
    pub fn submit(&mut self, command: Command) {
        apply(&mut self.world, command, &mut self.events);
    }

    /// Runs the systems against the pending events, then advances time by `dt`.
    ///
    /// Returns the events produced during this step.
    pub fn step(&mut self, dt: Duration, input: FrameInput) -> &[Event] {
        let observed = std::mem::take(&mut self.events);
        let crafts = query::craft_view(&self.world);

        let mut commands = Vec::new();
        let world = &self.world;
        self.hangar.handle(
            &observed,
            &crafts,
            input.hangar,
            |point| query::craft_at(world, point),
            &mut commands,
        );
        self.tower.handle(
            &observed,
            input.launch,
            &crafts,
            query::dragged_craft(world),
            &mut self.store,
            &mut commands,
        );

        let mut produced = Vec::new();
        for command in commands {
            apply(&mut self.world, command, &mut produced);
        }
        apply(&mut self.world, Command::Tick { dt }, &mut produced);

        self.takeoffs += produced
            .iter()
            .filter(|event| matches!(event, Event::CraftTookOff { .. }))
            .count();

        if self.store.handle(&produced) {
            self.reset(&mut produced);
        }

        self.events = produced;
        &self.events
    }

    /// Tears the world down and rebuilds it, restoring the snapshot if one is pending.
    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.world = build_world(&self.level, out_events);
        self.takeoffs = 0;
        self.resets += 1;
        info!(target: "taxiway.fleet", resets = self.resets, "world reset");
        self.populate_into(out_events);
    }

    fn populate(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        self.populate_into(&mut events);
        self.events = events;
    }

    /// Fills a freshly built world from the pending snapshot or the level.
    fn populate_into(&mut self, out_events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        let crafts = query::craft_view(&self.world);
        if !self.store.apply_restore(&crafts, &mut commands) {
            commands.extend(self.level.crafts.iter().map(|craft| Command::SpawnCraft {
                spec: craft.spec,
                cell: craft.cell,
                rotation: craft.rotation,
                depth: craft.depth,
            }));
        }
        for command in commands {
            apply(&mut self.world, command, out_events);
        }
    }
}
