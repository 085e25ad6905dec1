#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Launch gate that snapshots the arrangement and releases the fleet.

use taxiway_core::{Command, CraftId, CraftView, Event};
use taxiway_system_preflight::PreFlightStore;
use tracing::{debug, info, warn};

/// Pure system translating the player's launch request into the start signal.
#[derive(Clone, Debug)]
pub struct ControlTower {
    single_use: bool,
    used: bool,
    deferred: bool,
}

impl Default for ControlTower {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ControlTower {
    /// Creates a control tower; a single-use tower launches once per world.
    #[must_use]
    pub const fn new(single_use: bool) -> Self {
        Self {
            single_use,
            used: false,
            deferred: false,
        }
    }

    /// Reports whether a single-use tower has already launched this world.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        self.single_use && self.used
    }

    /// Reports whether a launch is waiting for a drag to settle.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Consumes world events and the launch request, emitting the start signal.
    ///
    /// The snapshot is captured into `store` immediately before
    /// [`Command::StartFleet`] is emitted. While `dragging` names a craft the
    /// launch is deferred: the drag is committed first and the capture happens
    /// on a later call, once the view no longer reflects an unresolved drag.
    /// An empty roster is reported and does not consume the tower.
    pub fn handle(
        &mut self,
        events: &[Event],
        launch: bool,
        crafts: &CraftView,
        dragging: Option<CraftId>,
        store: &mut PreFlightStore,
        out: &mut Vec<Command>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, Event::GridConfigured { .. }))
        {
            self.used = false;
            self.deferred = false;
        }

        if !(launch || self.deferred) || self.is_spent() {
            return;
        }

        if crafts.is_empty() {
            warn!(target: "taxiway.fleet", "launch requested with no craft on the grid");
            self.deferred = false;
            return;
        }

        if let Some(craft) = dragging {
            debug!(target: "taxiway.fleet", %craft, "launch deferred until the drag settles");
            self.deferred = true;
            out.push(Command::CommitDrag { craft });
            return;
        }

        let captured = store.capture(crafts);
        self.used = true;
        self.deferred = false;
        info!(target: "taxiway.fleet", craft = captured, "fleet cleared for departure");
        out.push(Command::StartFleet);
    }
}
