#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Snapshot store that carries the pre-flight arrangement across a world reset.
//!
//! The store lives outside the world so it survives the world being torn
//! down. A crash-triggered [`Event::ResetRequested`] arms a countdown; once it
//! expires the host rebuilds the world and calls
//! [`PreFlightStore::apply_restore`] to repopulate it.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use taxiway_core::{CellCoord, Command, CraftSpec, CraftView, Event, Rotation};
use tracing::{info, warn};

/// Recorded transform and placement of a single craft.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// World position of the craft's anchor corner.
    pub position: Vec3,
    /// World rotation of the sprite, in degrees.
    pub angle_degrees: f32,
    /// Grid cell the craft occupied.
    pub cell: CellCoord,
    /// Footprint rotation.
    pub rotation: Rotation,
    /// Static description used to recreate the craft.
    pub spec: CraftSpec,
}

/// Single live snapshot plus the pending-restore flag.
#[derive(Clone, Debug, Default)]
pub struct PreFlightStore {
    snapshot: Vec<SnapshotEntry>,
    pending: bool,
    countdown: Option<Duration>,
}

impl PreFlightStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every craft in roster order, overwriting any prior capture.
    ///
    /// Returns the number of captured entries.
    pub fn capture(&mut self, crafts: &CraftView) -> usize {
        self.snapshot = crafts
            .iter()
            .map(|craft| SnapshotEntry {
                position: craft.position,
                angle_degrees: craft.pose.angle_degrees,
                cell: craft.cell,
                rotation: craft.rotation,
                spec: craft.spec,
            })
            .collect();
        info!(target: "taxiway.preflight", entries = self.snapshot.len(), "snapshot captured");
        self.snapshot.len()
    }

    /// Entries of the live snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &[SnapshotEntry] {
        &self.snapshot
    }

    /// Reports whether a restore is waiting for the next world build.
    #[must_use]
    pub fn has_pending_restore(&self) -> bool {
        self.pending
    }

    /// Arms a world reset after `delay`.
    ///
    /// Ignored when nothing was captured or a reset is already armed; returns
    /// whether the request was accepted.
    pub fn request_reset(&mut self, delay: Duration) -> bool {
        if self.snapshot.is_empty() {
            warn!(target: "taxiway.preflight", "reset requested without a snapshot");
            return false;
        }
        if self.countdown.is_some() {
            return false;
        }
        self.pending = true;
        self.countdown = Some(delay);
        info!(target: "taxiway.preflight", delay_secs = delay.as_secs_f32(), "reset armed");
        true
    }

    /// Consumes world events, returning `true` once the armed reset is due.
    pub fn handle(&mut self, events: &[Event]) -> bool {
        for event in events {
            match event {
                Event::ResetRequested { delay } => {
                    let _ = self.request_reset(*delay);
                }
                Event::TimeAdvanced { dt } => {
                    if let Some(remaining) = self.countdown.as_mut() {
                        *remaining = remaining.saturating_sub(*dt);
                    }
                }
                _ => {}
            }
        }

        if self.countdown == Some(Duration::ZERO) {
            self.countdown = None;
            return true;
        }
        false
    }

    /// Emits the commands that rebuild the roster from the snapshot.
    ///
    /// Current craft are destroyed, dangling ownership is purged, then every
    /// entry is spawned at its recorded cell and rotation. Does nothing unless
    /// a restore is pending; returns whether commands were emitted.
    pub fn apply_restore(&mut self, crafts: &CraftView, out: &mut Vec<Command>) -> bool {
        if !self.pending {
            return false;
        }

        for craft in crafts.iter() {
            out.push(Command::DespawnCraft { craft: craft.id });
        }
        out.push(Command::PurgeDanglingOwnership);
        for entry in &self.snapshot {
            out.push(Command::SpawnCraft {
                spec: entry.spec,
                cell: entry.cell,
                rotation: entry.rotation,
                depth: entry.position.z,
            });
        }

        self.pending = false;
        self.countdown = None;
        info!(target: "taxiway.preflight", entries = self.snapshot.len(), "snapshot restored");
        true
    }
}
