use std::time::Duration;

use glam::{Vec2, Vec3};
use taxiway_core::{CellCoord, Command, CraftId, Event, FlightTuning, PlacementError};
use taxiway_system_bootstrap::{FrameInput, Level, Session};
use taxiway_system_hangar::HangarInput;
use taxiway_world::query;

const FRAME: Duration = Duration::from_millis(100);

fn level(crafts: &str) -> Level {
    let contents = format!(
        r#"
        version = 1
        area = {{ min = [0.0, 0.0], max = [10.0, 10.0] }}
        fit = {{ mode = "fixed_cell_size", cell_size = 1.0 }}
        {crafts}
        "#
    );
    Level::from_toml_str(&contents).expect("test level should parse")
}

const HEAD_ON: &str = r#"
    [[crafts]]
    cell = { column = 0, row = 0 }

    [[crafts]]
    cell = { column = 3, row = 0 }
    rotation = 180
"#;

fn launch() -> FrameInput {
    FrameInput {
        launch: true,
        ..FrameInput::default()
    }
}

fn idle(session: &mut Session, frames: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.extend_from_slice(session.step(FRAME, FrameInput::default()));
    }
    events
}

#[test]
fn crash_reset_restores_the_launched_arrangement() {
    let mut session = Session::new(level(HEAD_ON));
    let second = CraftId::new(1);
    session.submit(Command::BeginDrag { craft: second });
    session.submit(Command::DragCraft {
        craft: second,
        position: Vec3::new(4.0, 0.0, 0.0),
    });
    session.submit(Command::CommitDrag { craft: second });

    let _ = session.step(FRAME, launch());
    assert_eq!(session.store().snapshot().len(), 2);
    assert_eq!(session.store().snapshot()[1].cell, CellCoord::new(4, 0));

    let events = idle(&mut session, 39);

    assert_eq!(session.resets(), 1, "exactly one reset per crash pair");
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::ResetRequested { .. }))
            .count(),
        1
    );

    let world = session.world();
    assert!(query::is_pre_flight(world));
    let view = query::craft_view(world);
    assert_eq!(view.len(), 2, "restore recreates every captured craft");
    let cells: Vec<CellCoord> = view.iter().map(|craft| craft.cell).collect();
    assert_eq!(cells, vec![CellCoord::new(0, 0), CellCoord::new(4, 0)]);
    for craft in view.iter() {
        assert_eq!(
            query::owned_cells(world, craft.id).len(),
            2,
            "restored craft {} should own its footprint",
            craft.id
        );
    }
    assert_eq!(query::occupied_cell_count(world), 4);
    assert!(!session.store().has_pending_restore());
}

#[test]
fn reset_waits_for_the_restart_delay() {
    let mut session = Session::new(level(HEAD_ON));
    let _ = session.step(FRAME, launch());

    let mut crashed_at = None;
    for frame in 2..=40 {
        let events = session.step(FRAME, FrameInput::default()).to_vec();
        if crashed_at.is_none()
            && events
                .iter()
                .any(|event| matches!(event, Event::ResetRequested { .. }))
        {
            crashed_at = Some(frame);
        }
        if session.resets() == 1 {
            let crashed_at = crashed_at.expect("reset follows a crash");
            assert_eq!(frame - crashed_at, 10, "restart delay is one second");
            return;
        }
    }
    panic!("the session never reset");
}

#[test]
fn departures_are_counted_against_the_roster() {
    let mut session = Session::new(level(
        r#"
        [[crafts]]
        cell = { column = 0, row = 0 }

        [[crafts]]
        cell = { column = 0, row = 5 }
        "#,
    ));
    let _ = session.step(FRAME, launch());
    assert!(!session.all_departed());

    let _ = idle(&mut session, 29);

    assert_eq!(session.takeoffs(), 2);
    assert!(session.all_departed());
    assert_eq!(session.resets(), 0);
    assert_eq!(query::occupied_cell_count(session.world()), 0);
}

#[test]
fn launch_with_no_craft_keeps_the_pre_flight_phase() {
    let mut session = Session::new(level(""));

    let events = session.step(FRAME, launch()).to_vec();

    assert!(!events.contains(&Event::PreFlightEnded));
    assert!(query::is_pre_flight(session.world()));
    assert!(!session.all_departed());
}

#[test]
fn pointer_drag_moves_a_craft_before_launch() {
    let mut session = Session::new(level(HEAD_ON));

    let _ = session.step(
        FRAME,
        FrameInput {
            hangar: HangarInput {
                press: true,
                pointer: Some(Vec3::new(0.5, 0.5, 0.0)),
                ..HangarInput::default()
            },
            launch: false,
        },
    );
    let events = session
        .step(
            FRAME,
            FrameInput {
                hangar: HangarInput {
                    release: true,
                    pointer: Some(Vec3::new(5.5, 5.5, 0.0)),
                    ..HangarInput::default()
                },
                launch: false,
            },
        )
        .to_vec();

    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::CraftPlaced { .. })),
        "the drop should commit, got {events:?}"
    );
    let craft = query::craft(session.world(), CraftId::new(0)).expect("craft exists");
    assert_eq!(craft.cell, CellCoord::new(5, 5));
    assert_eq!(
        query::craft_at(session.world(), Vec2::new(5.5, 5.5)),
        Some(CraftId::new(0))
    );
}

#[test]
fn launch_mid_drag_snapshots_the_settled_cells() {
    let mut session = Session::new(level(
        r#"
        [[crafts]]
        cell = { column = 0, row = 5 }

        [[crafts]]
        cell = { column = 3, row = 0 }
        "#,
    ));
    let held = CraftId::new(0);
    session.submit(Command::BeginDrag { craft: held });
    session.submit(Command::DragCraft {
        craft: held,
        position: Vec3::new(3.0, 0.0, 0.0),
    });

    let events = session.step(FRAME, launch()).to_vec();

    assert!(
        events.contains(&Event::PlacementRejected {
            craft: held,
            cell: CellCoord::new(3, 0),
            reason: PlacementError::Occupied,
        }),
        "the pending drop should resolve first, got {events:?}"
    );
    assert!(!events.contains(&Event::PreFlightEnded));
    assert!(session.store().snapshot().is_empty());

    let events = session.step(FRAME, FrameInput::default()).to_vec();

    assert!(events.contains(&Event::PreFlightEnded));
    let cells: Vec<CellCoord> = session
        .store()
        .snapshot()
        .iter()
        .map(|entry| entry.cell)
        .collect();
    assert_eq!(cells, vec![CellCoord::new(0, 5), CellCoord::new(3, 0)]);
}

#[test]
fn level_tuning_reaches_the_world() {
    let session = Session::new(level(
        r#"
        [[crafts]]
        cell = { column = 0, row = 0 }

        [tuning]
        restart_delay = 0.5
        "#,
    ));

    let tuning = query::tuning(session.world());
    assert_eq!(tuning.restart_delay, Duration::from_millis(500));
    assert_eq!(
        tuning,
        FlightTuning {
            restart_delay: Duration::from_millis(500),
            ..FlightTuning::default()
        }
    );
}
