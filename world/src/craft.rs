//! Per-craft motion state machine.

use std::{f32::consts::TAU, time::Duration};

use glam::{Vec2, Vec3};
use taxiway_core::{
    CellCoord, CraftId, CraftPose, CraftSpec, CraftState, FlightTuning, Footprint, GridSpace,
    Rotation, WorldRect,
};

/// Cell and rotation of a craft's first successful placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Hangar {
    pub(crate) cell: CellCoord,
    pub(crate) rotation: Rotation,
}

/// Progress stored between ticks for each animated phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Motion {
    Idle,
    Rolling {
        start: Vec3,
        heading: Vec2,
        elapsed: Duration,
    },
    TakingOff {
        base_angle: f32,
        elapsed: Duration,
    },
    Crashing {
        away: Vec2,
        start_angle: f32,
        start_scale: f32,
        elapsed: Duration,
        restart_trigger: bool,
    },
    Removed,
}

/// Milestones reported back to the world while advancing a craft.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Milestone {
    TakingOff,
    TookOff,
    Crashed { request_reset: bool },
}

#[derive(Clone, Debug)]
pub(crate) struct Craft {
    pub(crate) id: CraftId,
    pub(crate) spec: CraftSpec,
    pub(crate) rotation: Rotation,
    pub(crate) position: Vec3,
    pub(crate) pose: CraftPose,
    pub(crate) anchor: Option<CellCoord>,
    pub(crate) hangar: Option<Hangar>,
    motion: Motion,
    collider_enabled: bool,
}

impl Craft {
    pub(crate) fn new(id: CraftId, spec: CraftSpec, rotation: Rotation, position: Vec3) -> Self {
        Self {
            id,
            spec,
            rotation,
            position,
            pose: CraftPose::at_angle(rotation.degrees() as f32),
            anchor: None,
            hangar: None,
            motion: Motion::Idle,
            collider_enabled: true,
        }
    }

    pub(crate) fn footprint(&self) -> Footprint {
        Footprint::new(self.spec.footprint, self.rotation)
    }

    pub(crate) fn state(&self) -> CraftState {
        match self.motion {
            Motion::Idle => CraftState::Idle,
            Motion::Rolling { .. } => CraftState::Rolling,
            Motion::TakingOff { .. } => CraftState::TakingOff,
            Motion::Crashing { .. } => CraftState::Crashing,
            Motion::Removed => CraftState::Removed,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.motion == Motion::Idle
    }

    /// Cell the craft currently sits on.
    pub(crate) fn cell(&self, grid: &GridSpace) -> CellCoord {
        self.anchor
            .unwrap_or_else(|| grid.cell_at(self.position.truncate()))
    }

    /// Snaps the craft onto `cell` and records it as the hangar if none exists yet.
    pub(crate) fn settle(&mut self, cell: CellCoord, grid: &GridSpace) {
        self.position = grid.world_position(cell).extend(self.position.z);
        self.anchor = Some(cell);
        let rotation = self.rotation;
        let _ = self.hangar.get_or_insert(Hangar { cell, rotation });
    }

    pub(crate) fn turn_to(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.pose.angle_degrees = rotation.degrees() as f32;
    }

    /// World box of the enabled collider, if any.
    pub(crate) fn collider(&self, grid: &GridSpace) -> Option<WorldRect> {
        if !self.collider_enabled || self.motion == Motion::Removed {
            return None;
        }
        let size = self.footprint().effective_size();
        let extents = Vec2::new(size.width() as f32, size.height() as f32) * grid.cell_size();
        let corner = self.position.truncate();
        Some(WorldRect::from_corners(corner, corner + extents))
    }

    /// Enters `Rolling` from `Idle`; any other state ignores the signal.
    pub(crate) fn start_rolling(&mut self) -> Option<Vec2> {
        if !self.is_idle() {
            return None;
        }
        let heading = self.spec.forward_axis.heading(self.pose.angle_degrees);
        self.motion = Motion::Rolling {
            start: self.position,
            heading,
            elapsed: Duration::ZERO,
        };
        Some(heading)
    }

    /// Replaces any in-flight motion with the crash sequence.
    ///
    /// Returns `false` when the craft is already crashing or gone.
    pub(crate) fn begin_crash(&mut self, away: Vec2, restart_trigger: bool) -> bool {
        if matches!(self.motion, Motion::Crashing { .. } | Motion::Removed) {
            return false;
        }
        self.motion = Motion::Crashing {
            away,
            start_angle: self.pose.angle_degrees,
            start_scale: self.pose.scale,
            elapsed: Duration::ZERO,
            restart_trigger,
        };
        self.collider_enabled = false;
        self.anchor = None;
        true
    }

    /// Advances the active phase by one frame.
    pub(crate) fn advance(&mut self, dt: Duration, tuning: &FlightTuning) -> Option<Milestone> {
        match self.motion {
            Motion::Idle | Motion::Removed => None,
            Motion::Rolling {
                start,
                heading,
                elapsed,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                let required = self.spec.required_distance.max(0.0);
                let travelled = (self.spec.move_speed * elapsed.as_secs_f32()).min(required);
                let offset = heading * travelled;
                self.position = Vec3::new(start.x + offset.x, start.y + offset.y, start.z);
                self.anchor = None;

                if travelled >= required {
                    self.motion = Motion::TakingOff {
                        base_angle: self.pose.angle_degrees,
                        elapsed: Duration::ZERO,
                    };
                    Some(Milestone::TakingOff)
                } else {
                    self.motion = Motion::Rolling {
                        start,
                        heading,
                        elapsed,
                    };
                    None
                }
            }
            Motion::TakingOff {
                base_angle,
                elapsed,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                let t = progress(elapsed, tuning.takeoff_duration);
                let bank = (t * TAU).sin() * tuning.bank_amplitude_degrees;
                self.pose.angle_degrees = base_angle + bank;
                self.pose.alpha = 1.0 - t;

                if elapsed >= tuning.takeoff_duration {
                    self.motion = Motion::Removed;
                    Some(Milestone::TookOff)
                } else {
                    self.motion = Motion::TakingOff {
                        base_angle,
                        elapsed,
                    };
                    None
                }
            }
            Motion::Crashing {
                away,
                start_angle,
                start_scale,
                elapsed,
                restart_trigger,
            } => {
                let elapsed = elapsed.saturating_add(dt);
                let u = progress(elapsed, tuning.crash_duration);
                let eased = 1.0 - (1.0 - u) * (1.0 - u);

                self.pose.angle_degrees = start_angle + eased * 360.0 * tuning.crash_spins;
                let knockback = away * tuning.knockback_speed * (1.0 - u) * dt.as_secs_f32();
                self.position.x += knockback.x;
                self.position.y += knockback.y;
                self.pose.alpha = 1.0 - u;
                let end_scale = start_scale * (1.0 - tuning.shrink_amount);
                self.pose.scale = start_scale + (end_scale - start_scale) * eased;

                if elapsed >= tuning.crash_duration {
                    self.motion = Motion::Removed;
                    Some(Milestone::Crashed {
                        request_reset: restart_trigger,
                    })
                } else {
                    self.motion = Motion::Crashing {
                        away,
                        start_angle,
                        start_scale,
                        elapsed,
                        restart_trigger,
                    };
                    None
                }
            }
        }
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}
