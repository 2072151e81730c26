//! Stateless pole-placement validation.
//!
//! Every check here is a pure function of the candidate position and the
//! current world state; actions recompute them on every proposed move and
//! never cache the result.

use glam::Vec3;

use crate::component::BarrierTapeComponent;
use crate::config::BarrierTapeSpecs;
use crate::world::{Env, Scene, TerrainOracle, ground_distance};

/// Which of the two barrier poles a check refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoleIndex {
    First,
    Second,
}

impl PoleIndex {
    pub const ALL: [PoleIndex; 2] = [PoleIndex::First, PoleIndex::Second];

    #[inline]
    pub fn as_usize(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    pub fn from_usize(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            _ => None,
        }
    }
}

/// Ground-marker color shown under a previewed pole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerColor {
    Green,
    Red,
}

impl MarkerColor {
    pub fn from_validity(valid: bool) -> Self {
        if valid { Self::Green } else { Self::Red }
    }
}

/// Snaps a point onto the terrain directly below its (x, z) column.
pub fn snap_to_ground(terrain: &dyn TerrainOracle, point: Vec3) -> Vec3 {
    Vec3::new(point.x, terrain.ground_height(point.x, point.z), point.z)
}

/// Full validity pipeline for a proposed pole position.
///
/// Checks compose in order and short-circuit on the first failure:
/// 1. for the second pole, the span to the first pole must lie inside the
///    configured [min, max] window;
/// 2. the pole shape must not overlap world collision (skipped when no
///    collision oracle is available, matching poles that have no physical
///    shape yet) and must not stand in water;
/// 3. the ground area under the pole must classify as free;
/// 4. for the second pole, the tape line itself must be clear and its
///    midpoint must also sit on free ground.
pub fn is_valid_pole_position(
    index: PoleIndex,
    candidate: Vec3,
    tape: &BarrierTapeComponent,
    scene: &Scene,
    env: &Env<'_>,
    specs: &BarrierTapeSpecs,
) -> bool {
    let Ok(terrain) = env.terrain() else {
        return false;
    };

    let first_pole = tape.pole_position(scene, PoleIndex::First);
    if index == PoleIndex::Second {
        let Some(first) = first_pole else {
            return false;
        };
        let span = ground_distance(first, candidate);
        if span < specs.min_length || span > specs.max_length {
            return false;
        }
    }

    if let Ok(collision) = env.collision() {
        if collision.shape_would_collide(candidate, specs.pole_radius) {
            return false;
        }
    }
    if terrain.is_in_water(candidate) {
        return false;
    }

    if !is_free_ground(terrain, candidate, specs.sample_epsilon) {
        return false;
    }

    if index == PoleIndex::Second
        && let Some(first) = first_pole
    {
        let up = Vec3::Y * specs.pole_top_height;
        let from = first + up;
        let to = candidate + up;
        let direction = (to - from).normalize_or_zero();
        // Inset the endpoints so the ray does not graze the poles themselves.
        let from = from + direction * specs.pole_radius;
        let to = to - direction * specs.pole_radius;
        if let Ok(collision) = env.collision() {
            if collision.first_hit(from, to).is_some() {
                return false;
            }
        }
        let midpoint = (first + candidate) * 0.5;
        if !is_free_ground(terrain, midpoint, specs.sample_epsilon) {
            return false;
        }
    }

    true
}

/// Scans the nearest-legal-point samples around `point`.
///
/// The first illegal sample within epsilon rejects the whole check; free
/// samples mark acceptance but do not stop the scan. One offending point
/// nearby poisons the whole check, no matter how many free points surround
/// it.
fn is_free_ground(terrain: &dyn TerrainOracle, point: Vec3, epsilon: f32) -> bool {
    let mut accept = false;
    for sample in terrain.samples_near(point, epsilon) {
        if sample.point.distance(point) > epsilon {
            continue;
        }
        if sample.area.is_illegal_for_pole() {
            return false;
        }
        accept = true;
    }
    accept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityId, EntityKind, FlatTerrain, GroundArea, StaticColliders, Transform};

    fn setup() -> (Scene, BarrierTapeComponent) {
        let mut scene = Scene::new();
        let owner = scene.spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        let mut tape = BarrierTapeComponent::new(owner);
        tape.create_pole(&mut scene, PoleIndex::First).unwrap();
        (scene, tape)
    }

    #[test]
    fn first_pole_accepts_on_free_ground() {
        let (scene, tape) = setup();
        let terrain = FlatTerrain::new(0.0);
        let env = Env::new(Some(&terrain), None);

        assert!(is_valid_pole_position(
            PoleIndex::First,
            Vec3::new(2.0, 0.0, 0.0),
            &tape,
            &scene,
            &env,
            &BarrierTapeSpecs::default(),
        ));
    }

    #[test]
    fn second_pole_rejects_outside_the_length_window() {
        let (mut scene, mut tape) = setup();
        let terrain = FlatTerrain::new(0.0);
        tape.move_pole(&mut scene, &terrain, PoleIndex::First, Vec3::ZERO)
            .unwrap();
        let env = Env::new(Some(&terrain), None);
        let specs = BarrierTapeSpecs::default();

        assert!(!is_valid_pole_position(
            PoleIndex::Second,
            Vec3::new(specs.max_length + 1.0, 0.0, 0.0),
            &tape,
            &scene,
            &env,
            &specs,
        ));
        assert!(!is_valid_pole_position(
            PoleIndex::Second,
            Vec3::new(specs.min_length * 0.5, 0.0, 0.0),
            &tape,
            &scene,
            &env,
            &specs,
        ));
        assert!(is_valid_pole_position(
            PoleIndex::Second,
            Vec3::new(5.0, 0.0, 0.0),
            &tape,
            &scene,
            &env,
            &specs,
        ));
    }

    #[test]
    fn street_sample_poisons_the_check() {
        let (scene, tape) = setup();
        let candidate = Vec3::new(2.0, 0.0, 0.0);
        let terrain = FlatTerrain::new(0.0)
            .with_sample(candidate + Vec3::new(0.1, 0.0, 0.0), GroundArea::Street)
            .with_sample(candidate, GroundArea::Free);
        let env = Env::new(Some(&terrain), None);

        // The illegal sample was registered first, so the scan hits it first.
        assert!(!is_valid_pole_position(
            PoleIndex::First,
            candidate,
            &tape,
            &scene,
            &env,
            &BarrierTapeSpecs::default(),
        ));
    }

    #[test]
    fn illegal_sample_rejects_even_after_a_free_one() {
        let (scene, tape) = setup();
        let candidate = Vec3::new(2.0, 0.0, 0.0);
        // Same two samples, reversed registration order. A free sample does
        // not short-circuit the scan, so the later illegal one still rejects.
        let terrain = FlatTerrain::new(0.0)
            .with_sample(candidate, GroundArea::Free)
            .with_sample(candidate + Vec3::new(0.1, 0.0, 0.0), GroundArea::Street);
        let env = Env::new(Some(&terrain), None);

        assert!(!is_valid_pole_position(
            PoleIndex::First,
            candidate,
            &tape,
            &scene,
            &env,
            &BarrierTapeSpecs::default(),
        ));
    }

    #[test]
    fn samples_beyond_epsilon_are_ignored() {
        let (scene, tape) = setup();
        let candidate = Vec3::new(2.0, 0.0, 0.0);
        let specs = BarrierTapeSpecs::default();
        let terrain = FlatTerrain::new(0.0)
            .with_sample(candidate, GroundArea::Free)
            .with_sample(
                candidate + Vec3::new(specs.sample_epsilon * 4.0, 0.0, 0.0),
                GroundArea::Street,
            );
        let env = Env::new(Some(&terrain), None);

        assert!(is_valid_pole_position(
            PoleIndex::First,
            candidate,
            &tape,
            &scene,
            &env,
            &specs,
        ));
    }

    #[test]
    fn water_rejects_the_pole() {
        let (scene, tape) = setup();
        let candidate = Vec3::new(2.0, 0.0, 0.0);
        let terrain = FlatTerrain::new(0.0).with_water(candidate, 1.0);
        let env = Env::new(Some(&terrain), None);

        assert!(!is_valid_pole_position(
            PoleIndex::First,
            candidate,
            &tape,
            &scene,
            &env,
            &BarrierTapeSpecs::default(),
        ));
    }

    #[test]
    fn blocked_tape_line_rejects_the_second_pole() {
        let (mut scene, mut tape) = setup();
        let terrain = FlatTerrain::new(0.0);
        tape.move_pole(&mut scene, &terrain, PoleIndex::First, Vec3::ZERO)
            .unwrap();
        let specs = BarrierTapeSpecs::default();

        // Obstacle square in the middle of the tape line at pole-top height.
        let colliders = StaticColliders::new().with_sphere(
            Vec3::new(2.5, specs.pole_top_height, 0.0),
            0.3,
            EntityId(99),
        );
        let env = Env::with_all(&terrain, &colliders);

        assert!(!is_valid_pole_position(
            PoleIndex::Second,
            Vec3::new(5.0, 0.0, 0.0),
            &tape,
            &scene,
            &env,
            &specs,
        ));
    }

    #[test]
    fn validation_is_pure_across_repeated_calls() {
        let (scene, tape) = setup();
        let terrain = FlatTerrain::new(0.0);
        let env = Env::new(Some(&terrain), None);
        let specs = BarrierTapeSpecs::default();
        let candidate = Vec3::new(2.0, 0.0, 0.0);

        let first = is_valid_pole_position(PoleIndex::First, candidate, &tape, &scene, &env, &specs);
        let second =
            is_valid_pole_position(PoleIndex::First, candidate, &tape, &scene, &env, &specs);
        assert_eq!(first, second);
    }
}
