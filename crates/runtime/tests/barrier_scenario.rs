//! End-to-end barrier construction: a squad member plants both poles through
//! commands, the tape goes up, and the finished-barrier notification fires
//! exactly once.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cordon_core::{
    EntityKind, FlatTerrain, GroundArea, Notification, PlaceBarrierCommand, PoleIndex, Specs,
    Transform,
};
use cordon_runtime::Simulation;
use glam::Vec3;

const STEP: Duration = Duration::from_millis(100);

fn run_until_idle(sim: &mut Simulation, max_ticks: u32) {
    for _ in 0..max_ticks {
        sim.tick(STEP);
        if sim.idle() {
            return;
        }
    }
    panic!("simulation did not settle within {max_ticks} ticks");
}

#[test]
fn squad_builds_a_barrier_across_the_street() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();

    let mut sim = Simulation::new(Specs::default()).with_terrain(FlatTerrain::new(0.0));
    let squad = sim
        .world_mut()
        .scene
        .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));

    let finished = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&finished);
    sim.world_mut().hooks.observe(move |notification| {
        if matches!(notification, Notification::BarrierFinished { .. }) {
            *sink.borrow_mut() += 1;
        }
    });

    // The caller-supplied Y is deliberately wrong; movePole must snap it.
    assert!(sim.issue(
        squad,
        &PlaceBarrierCommand {
            index: PoleIndex::First,
            position: Vec3::new(2.0, 5.0, 0.0),
        }
    ));
    {
        let tape = sim.world().tape(squad).unwrap();
        assert_eq!(tape.num_poles(), 0);
        assert!(!tape.is_barrier());
        assert_eq!(tape.barrier_center(&sim.world().scene), Vec3::ZERO);
    }
    run_until_idle(&mut sim, 50);
    assert_eq!(sim.world().tape(squad).unwrap().num_poles(), 1);

    assert!(sim.issue(
        squad,
        &PlaceBarrierCommand {
            index: PoleIndex::Second,
            position: Vec3::new(7.0, 0.0, 0.0),
        }
    ));
    run_until_idle(&mut sim, 50);

    let world = sim.world();
    let tape = world.tape(squad).unwrap();
    assert_eq!(tape.num_poles(), 2);
    assert!(tape.is_finished_building());
    assert!(tape.is_barrier());
    assert!((tape.barrier_length(&world.scene) - 5.0).abs() < 1e-4);
    let first = tape.pole_position(&world.scene, PoleIndex::First).unwrap();
    assert_eq!(first, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(*finished.borrow(), 1);
}

#[test]
fn pole_on_the_train_track_is_refused() {
    let terrain =
        FlatTerrain::new(0.0).with_sample(Vec3::new(2.0, 0.0, 0.0), GroundArea::TrainTrack);
    let mut sim = Simulation::new(Specs::default()).with_terrain(terrain);
    let squad = sim
        .world_mut()
        .scene
        .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));

    assert!(sim.issue(
        squad,
        &PlaceBarrierCommand {
            index: PoleIndex::First,
            position: Vec3::new(2.0, 0.0, 0.0),
        }
    ));
    run_until_idle(&mut sim, 50);

    // The preview pole was cleaned up; only the squad member remains.
    assert_eq!(sim.world().tape(squad).unwrap().num_poles(), 0);
    assert_eq!(sim.world().scene.len(), 1);
}
