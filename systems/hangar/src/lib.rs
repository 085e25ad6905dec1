#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure pre-flight interaction system that turns pointer input into drag,
//! rotate and hangar-return commands.

use glam::{Vec2, Vec3};
use taxiway_core::{Command, CraftId, CraftView, Event};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HangarInput {
    /// Indicates whether the pointer was pressed on this frame.
    pub press: bool,
    /// Indicates whether the pointer was released on this frame.
    pub release: bool,
    /// Indicates whether the player requested a quarter turn on this frame.
    pub rotate: bool,
    /// Indicates whether the player asked to send the craft back to its hangar.
    pub return_to_hangar: bool,
    /// Pointer position already mapped to world space by the adapter.
    pub pointer: Option<Vec3>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Grab {
    craft: CraftId,
    offset: Vec2,
    last_target: Option<Vec2>,
}

/// Interaction system that lets the player arrange craft before launch.
#[derive(Clone, Debug)]
pub struct Hangar {
    pre_flight: bool,
    grab: Option<Grab>,
    selected: Option<CraftId>,
}

impl Default for Hangar {
    fn default() -> Self {
        Self::new()
    }
}

impl Hangar {
    /// Creates a hangar system ready for a fresh pre-flight phase.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pre_flight: true,
            grab: None,
            selected: None,
        }
    }

    /// Craft currently held by the pointer.
    #[must_use]
    pub fn held(&self) -> Option<CraftId> {
        self.grab.map(|grab| grab.craft)
    }

    /// Consumes world events and adapter-derived input to emit placement commands.
    ///
    /// The `craft_at` closure should mirror the semantics of the world's
    /// `query::craft_at` helper so the system can identify the craft under the
    /// pointer. Once the pre-flight phase ends the system stays silent until a
    /// new grid is configured.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        crafts: &CraftView,
        input: HangarInput,
        mut craft_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Vec2) -> Option<CraftId>,
    {
        for event in events {
            match event {
                Event::GridConfigured { .. } => *self = Self::new(),
                Event::PreFlightEnded => {
                    self.pre_flight = false;
                    self.grab = None;
                }
                Event::CraftDespawned { craft } | Event::CraftCrashing { craft, .. } => {
                    if self.held() == Some(*craft) {
                        self.grab = None;
                    }
                    if self.selected == Some(*craft) {
                        self.selected = None;
                    }
                }
                _ => {}
            }
        }

        if !self.pre_flight {
            return;
        }

        let pointer = input.pointer.map(Vec3::truncate);

        if input.press && self.grab.is_none() {
            if let Some(point) = pointer {
                if let Some(craft) = craft_at(point) {
                    if let Some(snapshot) = crafts.iter().find(|snapshot| snapshot.id == craft) {
                        self.grab = Some(Grab {
                            craft,
                            offset: snapshot.position.truncate() - point,
                            last_target: None,
                        });
                        self.selected = Some(craft);
                        out.push(Command::BeginDrag { craft });
                    }
                }
            }
        }

        if let (Some(grab), Some(point)) = (self.grab.as_mut(), pointer) {
            let target = point + grab.offset;
            if grab.last_target != Some(target) {
                grab.last_target = Some(target);
                out.push(Command::DragCraft {
                    craft: grab.craft,
                    position: target.extend(0.0),
                });
            }
        }

        let focus = self.held().or(self.selected);

        if input.rotate {
            if let Some(craft) = focus {
                out.push(Command::RotateCraft { craft });
            }
        }

        if input.return_to_hangar {
            if let Some(craft) = focus {
                self.grab = None;
                out.push(Command::ReturnToHangar { craft });
            }
        }

        if input.release {
            if let Some(grab) = self.grab.take() {
                out.push(Command::CommitDrag { craft: grab.craft });
            }
        }
    }
}
