//! End-to-end shooting scenarios: command validation, pursuit to weapon
//! range, the bounded shot budget, and the exactly-once gunshot
//! notification.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cordon_core::{
    EntityKind, FlatTerrain, HuntAndShootCommand, Notification, ShootCommand, Specs, Transform,
    WeaponConfiguration,
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

fn gunshot_counter(sim: &mut Simulation) -> Rc<RefCell<Vec<Notification>>> {
    let shots = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shots);
    sim.world_mut().hooks.observe(move |notification| {
        if matches!(notification, Notification::GunShot { .. }) {
            sink.borrow_mut().push(*notification);
        }
    });
    shots
}

#[test]
fn officer_hunts_down_a_fleeing_suspect() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();

    let mut sim = Simulation::new(Specs::default()).with_terrain(FlatTerrain::new(0.0));
    let officer = sim
        .world_mut()
        .scene
        .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
    let suspect = sim
        .world_mut()
        .scene
        .spawn(EntityKind::Person, Transform::at(Vec3::new(40.0, 0.0, 0.0)));
    let suspect_ref = sim.world().scene.weak_ref(suspect).unwrap();
    let shots = gunshot_counter(&mut sim);

    assert!(sim.issue(
        officer,
        &HuntAndShootCommand {
            target: suspect_ref,
            weapon: WeaponConfiguration::pistol().with_max_shots(1),
        }
    ));
    run_until_idle(&mut sim, 1000);

    assert_eq!(shots.borrow().len(), 1);
    assert_eq!(
        shots.borrow()[0],
        Notification::GunShot {
            shooter: officer,
            target: suspect,
        }
    );
    let health = sim.world().scene.get(suspect).unwrap().health;
    assert!((health.fraction - 0.66).abs() < 1e-4);
    // The officer closed to weapon range before firing.
    let officer_pos = sim.world().scene.get(officer).unwrap().transform.position;
    let range = WeaponConfiguration::pistol().shoot_range;
    assert!(officer_pos.distance(Vec3::new(40.0, 0.0, 0.0)) <= range);
}

#[test]
fn shoot_command_against_a_gone_target_queues_nothing() {
    let mut sim = Simulation::new(Specs::default()).with_terrain(FlatTerrain::new(0.0));
    let officer = sim
        .world_mut()
        .scene
        .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
    let suspect = sim
        .world_mut()
        .scene
        .spawn(EntityKind::Person, Transform::at(Vec3::new(5.0, 0.0, 0.0)));
    let suspect_ref = sim.world().scene.weak_ref(suspect).unwrap();
    sim.world_mut().scene.despawn(suspect);

    assert!(!sim.issue(
        officer,
        &ShootCommand {
            target: suspect_ref,
            weapon: WeaponConfiguration::pistol(),
        }
    ));
    assert!(sim.idle());
}
