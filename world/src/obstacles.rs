//! Headless obstacle collider set.

use glam::Vec2;
use taxiway_core::{ObstacleField, WorldRect};

/// Fixed list of axis-aligned obstacle colliders.
///
/// Hosts without a physics engine use this to answer the overlap queries the
/// grid fitter and placement validator issue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticObstacles {
    colliders: Vec<WorldRect>,
}

impl StaticObstacles {
    /// Creates an obstacle field from collider bounds.
    #[must_use]
    pub fn new(colliders: Vec<WorldRect>) -> Self {
        Self { colliders }
    }
}

impl ObstacleField for StaticObstacles {
    fn overlap_box(&self, center: Vec2, size: Vec2) -> bool {
        let probe = WorldRect::from_center_size(center, size);
        self.colliders.iter().any(|collider| collider.overlaps(&probe))
    }

    fn overlap_box_all(&self, center: Vec2, size: Vec2) -> Vec<WorldRect> {
        let probe = WorldRect::from_center_size(center, size);
        self.colliders
            .iter()
            .copied()
            .filter(|collider| collider.overlaps(&probe))
            .collect()
    }
}
