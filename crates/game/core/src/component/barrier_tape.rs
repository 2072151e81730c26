use arrayvec::ArrayVec;
use glam::Vec3;

use crate::placement::{self, PoleIndex};
use crate::world::{EntityId, EntityKind, Scene, TerrainOracle, Transform, ground_distance};

/// What the tape connects at its far end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TapeConnection {
    PoleToPole,
    PoleToSquad,
}

/// One planted barrier pole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pole {
    pub entity: EntityId,
    /// 1.0 is fully visible.
    pub transparency: f32,
}

/// The tape segment stretched between the poles (or pole and squad member).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tape {
    pub entity: EntityId,
    pub connection: TapeConnection,
    /// Connected police entity when the connection is pole-to-squad.
    pub police_entity: Option<EntityId>,
    pub transparency: f32,
}

/// Misuse of the barrier-tape mutator surface.
///
/// These indicate broken calling code or corrupt scene data, not recoverable
/// gameplay conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    #[error("second pole cannot exist before the first")]
    PoleOutOfOrder,
    #[error("no pole at index {0:?}")]
    NoSuchPole(PoleIndex),
    #[error("tape requires both poles")]
    MissingPoles,
    #[error("pole-to-squad tape requires a police entity")]
    MissingPolice,
    #[error("no tape exists")]
    NoTape,
}

/// Barrier tape attached to a squad member: up to two poles, the tape between
/// them, and the path-blocking state.
///
/// The component exclusively owns every sub-entity it spawns (poles, tape,
/// collision box); [`BarrierTapeComponent::shutdown`] despawns them all.
/// Mutators are the public API and the replication surface; each one checks
/// for no-change before doing work so that replayed network updates stay
/// idempotent.
#[derive(Clone, Debug)]
pub struct BarrierTapeComponent {
    owner: EntityId,
    poles: [Option<Pole>; 2],
    tape: Option<Tape>,
    finished_building: bool,
    barrier: bool,
    collision_box: Option<EntityId>,
    /// Sub-entities spawned by this component, for teardown.
    owned: ArrayVec<EntityId, 4>,
}

impl BarrierTapeComponent {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            poles: [None, None],
            tape: None,
            finished_building: false,
            barrier: false,
            collision_box: None,
            owned: ArrayVec::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    // ------------------------------------------------------------------
    // Pole lifecycle
    // ------------------------------------------------------------------

    /// Spawns the pole at the given index. The second pole requires the first
    /// to exist. Re-creating an existing pole is a no-op.
    pub fn create_pole(&mut self, scene: &mut Scene, index: PoleIndex) -> Result<(), BarrierError> {
        if index == PoleIndex::Second
            && self.poles[index.as_usize()].is_none()
            && self.poles[PoleIndex::First.as_usize()].is_none()
        {
            return Err(BarrierError::PoleOutOfOrder);
        }
        self.restore_pole(scene, index);
        Ok(())
    }

    /// Materializes a pole slot without the creation-order rule. Destroying
    /// the first pole legitimately leaves only the second standing, so a
    /// receiver mirroring such a component must be able to fill either slot
    /// alone; gameplay code goes through [`Self::create_pole`]. No-op when
    /// the pole already exists.
    pub fn restore_pole(&mut self, scene: &mut Scene, index: PoleIndex) {
        if self.poles[index.as_usize()].is_some() {
            return;
        }
        let start = scene
            .get(self.owner)
            .map(|entity| entity.transform.position)
            .unwrap_or(Vec3::ZERO);
        let entity = scene.spawn(EntityKind::BarrierPole, Transform::at(start));
        self.poles[index.as_usize()] = Some(Pole {
            entity,
            transparency: 1.0,
        });
        self.owned.push(entity);
    }

    /// Moves a pole to the target point. The stored Y coordinate is always the
    /// terrain height below (x, z); the caller-supplied Y is never trusted.
    pub fn move_pole(
        &mut self,
        scene: &mut Scene,
        terrain: &dyn TerrainOracle,
        index: PoleIndex,
        target: Vec3,
    ) -> Result<(), BarrierError> {
        let pole = self.poles[index.as_usize()].ok_or(BarrierError::NoSuchPole(index))?;
        let snapped = placement::snap_to_ground(terrain, target);
        if let Some(entity) = scene.get_mut(pole.entity) {
            if entity.transform.position != snapped {
                entity.transform.position = snapped;
            }
        }
        Ok(())
    }

    pub fn set_pole_transparency(
        &mut self,
        index: PoleIndex,
        transparency: f32,
    ) -> Result<(), BarrierError> {
        let pole = self.poles[index.as_usize()]
            .as_mut()
            .ok_or(BarrierError::NoSuchPole(index))?;
        if pole.transparency != transparency {
            pole.transparency = transparency;
        }
        Ok(())
    }

    /// Despawns a pole. Any tape is torn down with it. No-op when absent.
    pub fn destroy_pole(&mut self, scene: &mut Scene, index: PoleIndex) {
        let Some(pole) = self.poles[index.as_usize()].take() else {
            return;
        };
        self.destroy_tape(scene);
        scene.despawn(pole.entity);
        self.owned.retain(|owned| *owned != pole.entity);
    }

    // ------------------------------------------------------------------
    // Tape lifecycle
    // ------------------------------------------------------------------

    /// Stretches the tape. Pole-to-pole requires both poles; pole-to-squad
    /// requires the first pole and the connected police entity. Re-creating
    /// with identical parameters is a no-op; changed parameters update the
    /// existing tape without a respawn.
    pub fn create_tape(
        &mut self,
        scene: &mut Scene,
        connection: TapeConnection,
        police_entity: Option<EntityId>,
    ) -> Result<(), BarrierError> {
        match connection {
            TapeConnection::PoleToPole => {
                if self.poles.iter().any(Option::is_none) {
                    return Err(BarrierError::MissingPoles);
                }
            }
            TapeConnection::PoleToSquad => {
                if self.poles[PoleIndex::First.as_usize()].is_none() {
                    return Err(BarrierError::MissingPoles);
                }
                if police_entity.is_none() {
                    return Err(BarrierError::MissingPolice);
                }
            }
        }

        if let Some(tape) = &mut self.tape {
            if tape.connection != connection {
                tape.connection = connection;
            }
            if tape.police_entity != police_entity {
                tape.police_entity = police_entity;
            }
            return Ok(());
        }

        let entity = scene.spawn(EntityKind::BarrierTape, Transform::at(self.center(scene)));
        self.tape = Some(Tape {
            entity,
            connection,
            police_entity,
            transparency: 1.0,
        });
        self.owned.push(entity);
        Ok(())
    }

    pub fn destroy_tape(&mut self, scene: &mut Scene) {
        let Some(tape) = self.tape.take() else {
            return;
        };
        scene.despawn(tape.entity);
        self.owned.retain(|owned| *owned != tape.entity);
    }

    pub fn set_tape_transparency(&mut self, transparency: f32) -> Result<(), BarrierError> {
        let tape = self.tape.as_mut().ok_or(BarrierError::NoTape)?;
        if tape.transparency != transparency {
            tape.transparency = transparency;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Barrier state
    // ------------------------------------------------------------------

    /// Marks the build as finished; a finished barrier blocks pedestrian
    /// pathing. No-op when unchanged.
    pub fn set_finished_building(&mut self, finished: bool) {
        if self.finished_building != finished {
            self.finished_building = finished;
        }
    }

    /// Toggles the AI-navigation collision geometry. The blocking box is
    /// spawned exactly when the flag flips on and despawned when it flips
    /// off; replaying the current value never respawns it.
    pub fn set_barrier(&mut self, scene: &mut Scene, barrier: bool) {
        if self.barrier == barrier {
            return;
        }
        self.barrier = barrier;
        if barrier {
            let entity = scene.spawn(EntityKind::CollisionBox, Transform::at(self.center(scene)));
            self.collision_box = Some(entity);
            self.owned.push(entity);
        } else if let Some(entity) = self.collision_box.take() {
            scene.despawn(entity);
            self.owned.retain(|owned| *owned != entity);
        }
    }

    /// Despawns every sub-entity this component created.
    pub fn shutdown(&mut self, scene: &mut Scene) {
        for entity in self.owned.drain(..) {
            scene.despawn(entity);
        }
        self.poles = [None, None];
        self.tape = None;
        self.collision_box = None;
        self.finished_building = false;
        self.barrier = false;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn num_poles(&self) -> usize {
        self.poles.iter().filter(|pole| pole.is_some()).count()
    }

    pub fn pole(&self, index: PoleIndex) -> Option<&Pole> {
        self.poles[index.as_usize()].as_ref()
    }

    pub fn pole_position(&self, scene: &Scene, index: PoleIndex) -> Option<Vec3> {
        let pole = self.poles[index.as_usize()]?;
        Some(scene.get(pole.entity)?.transform.position)
    }

    pub fn tape(&self) -> Option<&Tape> {
        self.tape.as_ref()
    }

    pub fn has_tape(&self) -> bool {
        self.tape.is_some()
    }

    pub fn is_finished_building(&self) -> bool {
        self.finished_building
    }

    pub fn is_barrier(&self) -> bool {
        self.barrier
    }

    /// Midpoint of the planted poles; the zero vector while no pole stands.
    pub fn barrier_center(&self, scene: &Scene) -> Vec3 {
        let positions: Vec<Vec3> = [PoleIndex::First, PoleIndex::Second]
            .into_iter()
            .filter_map(|index| self.pole_position(scene, index))
            .collect();
        match positions.len() {
            0 => Vec3::ZERO,
            n => positions.iter().sum::<Vec3>() / n as f32,
        }
    }

    /// Ground-plane span between the two poles; zero until both stand.
    pub fn barrier_length(&self, scene: &Scene) -> f32 {
        match (
            self.pole_position(scene, PoleIndex::First),
            self.pole_position(scene, PoleIndex::Second),
        ) {
            (Some(first), Some(second)) => ground_distance(first, second),
            _ => 0.0,
        }
    }

    fn center(&self, scene: &Scene) -> Vec3 {
        self.barrier_center(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::FlatTerrain;

    fn squad_scene() -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let owner = scene.spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        (scene, owner)
    }

    #[test]
    fn second_pole_requires_the_first() {
        let (mut scene, owner) = squad_scene();
        let mut tape = BarrierTapeComponent::new(owner);

        assert_eq!(
            tape.create_pole(&mut scene, PoleIndex::Second),
            Err(BarrierError::PoleOutOfOrder)
        );
        tape.create_pole(&mut scene, PoleIndex::First).unwrap();
        tape.create_pole(&mut scene, PoleIndex::Second).unwrap();
        assert_eq!(tape.num_poles(), 2);
    }

    #[test]
    fn restore_pole_fills_the_second_slot_alone() {
        let (mut scene, owner) = squad_scene();
        let mut tape = BarrierTapeComponent::new(owner);

        assert_eq!(
            tape.create_pole(&mut scene, PoleIndex::Second),
            Err(BarrierError::PoleOutOfOrder)
        );
        tape.restore_pole(&mut scene, PoleIndex::Second);
        assert_eq!(tape.num_poles(), 1);
        assert!(tape.pole(PoleIndex::First).is_none());
        assert!(tape.pole(PoleIndex::Second).is_some());
    }

    #[test]
    fn create_pole_twice_is_a_noop() {
        let (mut scene, owner) = squad_scene();
        let mut tape = BarrierTapeComponent::new(owner);
        tape.create_pole(&mut scene, PoleIndex::First).unwrap();
        let entity = tape.pole(PoleIndex::First).unwrap().entity;

        tape.create_pole(&mut scene, PoleIndex::First).unwrap();
        assert_eq!(tape.pole(PoleIndex::First).unwrap().entity, entity);
        assert_eq!(tape.num_poles(), 1);
    }

    #[test]
    fn move_pole_snaps_to_terrain_height() {
        let (mut scene, owner) = squad_scene();
        let terrain = FlatTerrain::new(3.5);
        let mut tape = BarrierTapeComponent::new(owner);
        tape.create_pole(&mut scene, PoleIndex::First).unwrap();

        tape.move_pole(
            &mut scene,
            &terrain,
            PoleIndex::First,
            Vec3::new(4.0, 99.0, 2.0),
        )
        .unwrap();

        let position = tape.pole_position(&scene, PoleIndex::First).unwrap();
        assert_eq!(position, Vec3::new(4.0, 3.5, 2.0));
    }

    #[test]
    fn tape_needs_both_poles() {
        let (mut scene, owner) = squad_scene();
        let mut tape = BarrierTapeComponent::new(owner);
        tape.create_pole(&mut scene, PoleIndex::First).unwrap();

        assert_eq!(
            tape.create_tape(&mut scene, TapeConnection::PoleToPole, None),
            Err(BarrierError::MissingPoles)
        );
        tape.create_pole(&mut scene, PoleIndex::Second).unwrap();
        tape.create_tape(&mut scene, TapeConnection::PoleToPole, None)
            .unwrap();
        assert!(tape.has_tape());
    }

    #[test]
    fn replaying_set_barrier_keeps_the_same_collision_box() {
        let (mut scene, owner) = squad_scene();
        let mut tape = BarrierTapeComponent::new(owner);
        tape.set_barrier(&mut scene, true);
        let boxes: Vec<EntityId> = scene
            .iter()
            .filter(|(_, e)| e.kind == EntityKind::CollisionBox)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(boxes.len(), 1);

        tape.set_barrier(&mut scene, true);
        let after: Vec<EntityId> = scene
            .iter()
            .filter(|(_, e)| e.kind == EntityKind::CollisionBox)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(boxes, after);

        tape.set_barrier(&mut scene, false);
        assert!(
            scene
                .iter()
                .all(|(_, e)| e.kind != EntityKind::CollisionBox)
        );
    }

    #[test]
    fn shutdown_despawns_every_owned_entity() {
        let (mut scene, owner) = squad_scene();
        let terrain = FlatTerrain::new(0.0);
        let mut tape = BarrierTapeComponent::new(owner);
        tape.create_pole(&mut scene, PoleIndex::First).unwrap();
        tape.create_pole(&mut scene, PoleIndex::Second).unwrap();
        tape.move_pole(&mut scene, &terrain, PoleIndex::Second, Vec3::new(5.0, 0.0, 0.0))
            .unwrap();
        tape.create_tape(&mut scene, TapeConnection::PoleToPole, None)
            .unwrap();
        tape.set_barrier(&mut scene, true);
        assert_eq!(scene.len(), 5);

        tape.shutdown(&mut scene);
        // Only the owner survives.
        assert_eq!(scene.len(), 1);
        assert_eq!(tape.num_poles(), 0);
        assert!(!tape.has_tape());
        assert!(!tape.is_barrier());
    }

    #[test]
    fn center_and_length_track_the_poles() {
        let (mut scene, owner) = squad_scene();
        let terrain = FlatTerrain::new(0.0);
        let mut tape = BarrierTapeComponent::new(owner);
        assert_eq!(tape.barrier_center(&scene), Vec3::ZERO);
        assert_eq!(tape.barrier_length(&scene), 0.0);

        tape.create_pole(&mut scene, PoleIndex::First).unwrap();
        tape.create_pole(&mut scene, PoleIndex::Second).unwrap();
        tape.move_pole(&mut scene, &terrain, PoleIndex::First, Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        tape.move_pole(&mut scene, &terrain, PoleIndex::Second, Vec3::new(6.0, 0.0, 0.0))
            .unwrap();

        assert!((tape.barrier_length(&scene) - 5.0).abs() < 1e-5);
        assert_eq!(tape.barrier_center(&scene), Vec3::new(3.5, 0.0, 0.0));
    }
}
