use glam::{Vec2, Vec3};
use taxiway_core::{
    CellCoord, CellRect, CellSize, Command, CraftId, CraftSpec, Event, FitMode, Footprint,
    GridFit, ObstacleField, PlacementError, Rotation, WorldRect,
};
use taxiway_world::{apply, query, StaticObstacles, World};

fn configure(world: &mut World, columns: u32, rows: u32) {
    let mut events = Vec::new();
    apply(
        world,
        Command::ConfigureGrid(GridFit::new(
            WorldRect::from_corners(Vec2::ZERO, Vec2::new(columns as f32, rows as f32)),
            FitMode::FixedCount { columns, rows },
        )),
        &mut events,
    );
    assert!(
        matches!(events.as_slice(), [Event::GridConfigured { .. }]),
        "grid should configure, got {events:?}"
    );
}

fn spawn(world: &mut World, cell: CellCoord, rotation: Rotation) -> CraftId {
    let mut events = Vec::new();
    apply(
        world,
        Command::SpawnCraft {
            spec: CraftSpec::default(),
            cell,
            rotation,
            depth: 0.0,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::CraftSpawned { craft, .. }] => *craft,
        other => panic!("unexpected spawn events {other:?}"),
    }
}

fn drag_to(world: &mut World, craft: CraftId, cell: CellCoord) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, Command::BeginDrag { craft }, &mut events);
    apply(
        world,
        Command::DragCraft {
            craft,
            position: Vec3::new(cell.column() as f32, cell.row() as f32, 0.0),
        },
        &mut events,
    );
    apply(world, Command::CommitDrag { craft }, &mut events);
    events
}

/// Obstacle collaborator whose colliders appear only to live overlap checks.
#[derive(Debug)]
struct LateObstacles(Vec<WorldRect>);

impl ObstacleField for LateObstacles {
    fn overlap_box(&self, center: Vec2, size: Vec2) -> bool {
        let probe = WorldRect::from_center_size(center, size);
        self.0.iter().any(|collider| collider.overlaps(&probe))
    }

    fn overlap_box_all(&self, _center: Vec2, _size: Vec2) -> Vec<WorldRect> {
        Vec::new()
    }
}

#[test]
fn rotated_footprint_swaps_its_block() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 6, 6);

    let craft = spawn(&mut world, CellCoord::new(2, 1), Rotation::Deg90);

    assert_eq!(
        query::owned_cells(&world, craft),
        vec![CellCoord::new(2, 1), CellCoord::new(2, 2)],
        "a 2x1 craft at 90 degrees should cover a 1x2 block"
    );
}

#[test]
fn dropping_onto_another_craft_rolls_back() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 6, 6);
    let parked = spawn(&mut world, CellCoord::new(3, 3), Rotation::Deg0);
    let moving = spawn(&mut world, CellCoord::new(0, 0), Rotation::Deg0);

    assert_eq!(
        query::can_place(
            &world,
            &CraftSpec::default(),
            CellCoord::new(2, 3),
            Rotation::Deg0
        ),
        Err(PlacementError::Occupied),
        "cells owned by another craft must not be placeable"
    );

    let events = drag_to(&mut world, moving, CellCoord::new(2, 3));

    assert!(
        events.contains(&Event::PlacementPreviewed {
            craft: moving,
            cell: CellCoord::new(2, 3),
            placeable: false,
        }),
        "preview should flag the occupied target, got {events:?}"
    );
    assert_eq!(
        events.last(),
        Some(&Event::PlacementRejected {
            craft: moving,
            cell: CellCoord::new(2, 3),
            reason: PlacementError::Occupied,
        })
    );
    assert_eq!(
        query::owned_cells(&world, moving),
        vec![CellCoord::new(0, 0), CellCoord::new(1, 0)],
        "rollback should restore the pre-drag cells"
    );
    assert_eq!(
        query::owned_cells(&world, parked),
        vec![CellCoord::new(3, 3), CellCoord::new(4, 3)]
    );
    let snapshot = query::craft(&world, moving).expect("craft should still exist");
    assert_eq!(snapshot.position, Vec3::ZERO);
    assert_eq!(snapshot.cell, CellCoord::new(0, 0));
}

#[test]
fn rejected_drop_undoes_a_turn_made_mid_drag() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 5, 5);
    let craft = spawn(&mut world, CellCoord::new(0, 0), Rotation::Deg0);

    let mut events = Vec::new();
    apply(&mut world, Command::BeginDrag { craft }, &mut events);
    apply(
        &mut world,
        Command::DragCraft {
            craft,
            position: Vec3::new(4.0, 4.0, 0.0),
        },
        &mut events,
    );
    apply(&mut world, Command::RotateCraft { craft }, &mut events);
    assert!(events.contains(&Event::CraftRotated {
        craft,
        rotation: Rotation::Deg90,
    }));
    apply(&mut world, Command::CommitDrag { craft }, &mut events);

    assert_eq!(
        events.last(),
        Some(&Event::PlacementRejected {
            craft,
            cell: CellCoord::new(4, 4),
            reason: PlacementError::OutOfBounds,
        })
    );
    let snapshot = query::craft(&world, craft).expect("craft should still exist");
    assert_eq!(snapshot.rotation, Rotation::Deg0);
    assert_eq!(snapshot.pose.angle_degrees, 0.0);
    assert_eq!(snapshot.cell, CellCoord::new(0, 0));

    let footprint: Vec<CellCoord> = Footprint::new(snapshot.spec.footprint, snapshot.rotation)
        .cells(snapshot.cell)
        .collect();
    assert_eq!(
        query::owned_cells(&world, craft),
        footprint,
        "owned cells must match the restored footprint"
    );
}

#[test]
fn committed_drop_claims_the_new_region() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 6, 6);
    let craft = spawn(&mut world, CellCoord::new(0, 0), Rotation::Deg0);

    let events = drag_to(&mut world, craft, CellCoord::new(4, 5));

    assert_eq!(
        events.last(),
        Some(&Event::CraftPlaced {
            craft,
            region: CellRect::from_origin_and_size(CellCoord::new(4, 5), CellSize::new(2, 1)),
        })
    );
    assert!(!query::is_cell_occupied(&world, CellCoord::new(0, 0)));
    assert!(query::is_cell_occupied(&world, CellCoord::new(5, 5)));
    let snapshot = query::craft(&world, craft).expect("craft exists");
    assert_eq!(
        snapshot.hangar,
        Some(CellCoord::new(0, 0)),
        "the hangar stays at the first successful placement"
    );
}

#[test]
fn live_obstacle_check_backs_up_cell_marking() {
    let late = WorldRect::from_corners(Vec2::new(4.5, 0.5), Vec2::new(4.6, 0.6));
    let mut world = World::new(Box::new(LateObstacles(vec![late])));
    configure(&mut world, 6, 6);

    assert!(!query::is_cell_blocked(&world, CellCoord::new(4, 0)));
    assert_eq!(
        query::can_place(
            &world,
            &CraftSpec::default(),
            CellCoord::new(3, 0),
            Rotation::Deg0
        ),
        Err(PlacementError::ObstacleOverlap)
    );
    assert_eq!(
        query::can_place(
            &world,
            &CraftSpec::default(),
            CellCoord::new(3, 1),
            Rotation::Deg0
        ),
        Ok(())
    );
}

#[test]
fn hangar_return_succeeds_onto_an_obstacle() {
    let late = WorldRect::from_corners(Vec2::new(0.2, 0.2), Vec2::new(0.8, 0.8));
    let mut world = World::new(Box::new(LateObstacles(vec![late])));
    configure(&mut world, 6, 6);
    let craft = spawn(&mut world, CellCoord::new(0, 0), Rotation::Deg0);
    let _ = drag_to(&mut world, craft, CellCoord::new(2, 4));

    let mut events = Vec::new();
    apply(&mut world, Command::ReturnToHangar { craft }, &mut events);

    assert_eq!(
        events,
        vec![Event::CraftReturnedToHangar {
            craft,
            cell: CellCoord::new(0, 0),
        }]
    );
    assert_eq!(
        query::owned_cells(&world, craft),
        vec![CellCoord::new(0, 0), CellCoord::new(1, 0)]
    );
}

#[test]
fn full_turn_restores_the_original_cells() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 6, 6);
    let craft = spawn(&mut world, CellCoord::new(2, 2), Rotation::Deg0);
    let before = query::owned_cells(&world, craft);

    let mut events = Vec::new();
    for _ in 0..4 {
        apply(&mut world, Command::RotateCraft { craft }, &mut events);
    }

    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::CraftRotated { .. }))
            .count(),
        4,
        "every quarter turn fits in open space"
    );
    assert_eq!(query::owned_cells(&world, craft), before);
    assert_eq!(query::occupied_cell_count(&world), 2);
}

#[test]
fn rotation_blocked_by_a_neighbour_keeps_the_old_footprint() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 6, 6);
    let craft = spawn(&mut world, CellCoord::new(1, 1), Rotation::Deg0);
    let _neighbour = spawn(&mut world, CellCoord::new(1, 2), Rotation::Deg0);

    let mut events = Vec::new();
    apply(&mut world, Command::RotateCraft { craft }, &mut events);

    assert_eq!(
        events,
        vec![Event::RotationRejected {
            craft,
            reason: PlacementError::Occupied,
        }]
    );
    let snapshot = query::craft(&world, craft).expect("craft exists");
    assert_eq!(snapshot.rotation, Rotation::Deg0);
    assert_eq!(
        query::owned_cells(&world, craft),
        vec![CellCoord::new(1, 1), CellCoord::new(2, 1)]
    );
}

#[test]
fn despawn_then_purge_leaves_a_clean_table() {
    let mut world = World::new(Box::new(StaticObstacles::default()));
    configure(&mut world, 4, 4);
    let craft = spawn(&mut world, CellCoord::new(0, 0), Rotation::Deg0);

    let mut events = Vec::new();
    apply(&mut world, Command::DespawnCraft { craft }, &mut events);
    apply(&mut world, Command::PurgeDanglingOwnership, &mut events);

    assert_eq!(events, vec![Event::CraftDespawned { craft }]);
    assert_eq!(query::occupied_cell_count(&world), 0);
    assert!(query::owners(&world).is_empty());
    assert!(query::roster(&world).is_empty());
}
