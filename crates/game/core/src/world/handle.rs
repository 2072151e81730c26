use std::fmt;

use crate::world::transform::Transform;

/// Unique identifier for any entity tracked in the scene.
///
/// The id doubles as the slot index in the [`Scene`] arena. Holding a bare
/// `EntityId` across ticks is unsafe against despawn/respawn reuse; use an
/// [`EntityRef`] for anything that outlives the current call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generation-checked weak reference to an entity.
///
/// Resolving against the scene costs O(1) and fails cleanly once the slot has
/// been despawned or reused, so a holder never dereferences a dangling entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    pub id: EntityId,
    pub generation: u32,
}

/// Broad gameplay category of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Person,
    Vehicle,
    BarrierPole,
    BarrierTape,
    CollisionBox,
    Other,
}

/// Damage state shared by persons and vehicles.
///
/// `fraction` runs from 1.0 (unharmed) to 0.0; reaching zero marks a person
/// injured or a vehicle destroyed.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    pub fraction: f32,
    pub injured: bool,
    pub destroyed: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            fraction: 1.0,
            injured: false,
            destroyed: false,
        }
    }
}

impl Health {
    /// True while the entity can still act or be acted upon as a live target.
    #[inline]
    pub fn is_intact(&self) -> bool {
        !self.injured && !self.destroyed
    }
}

/// A single entity in the scene.
#[derive(Clone, Debug)]
pub struct Entity {
    pub kind: EntityKind,
    pub transform: Transform,
    pub health: Health,
    /// Set while the entity sits inside another one (vehicle, building).
    pub contained_in: Option<EntityId>,
    /// Suppresses damage application while set (used during scripted moments).
    pub invincible: bool,
    /// Ladder rig state for DLK-style vehicles.
    pub ladder_deployed: bool,
    /// Support legs state for DLK-style vehicles.
    pub support_legs_extended: bool,
}

impl Entity {
    fn new(kind: EntityKind, transform: Transform) -> Self {
        Self {
            kind,
            transform,
            health: Health::default(),
            contained_in: None,
            invincible: false,
            ladder_deployed: false,
            support_legs_extended: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Generational arena holding every live entity.
///
/// Stand-in for the host engine's entity framework: spawn/despawn, transform
/// access, and weak-reference resolution are the only capabilities gameplay
/// code relies on.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an entity and returns its id.
    pub fn spawn(&mut self, kind: EntityKind, transform: Transform) -> EntityId {
        if let Some(index) = self.slots.iter().position(|slot| slot.entity.is_none()) {
            self.slots[index].entity = Some(Entity::new(kind, transform));
            EntityId(index as u32)
        } else {
            self.slots.push(Slot {
                generation: 0,
                entity: Some(Entity::new(kind, transform)),
            });
            EntityId(self.slots.len() as u32 - 1)
        }
    }

    /// Despawns an entity, bumping the slot generation so stale [`EntityRef`]s
    /// stop resolving. Returns false if the entity was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.slots.get_mut(id.0 as usize) {
            Some(slot) if slot.entity.is_some() => {
                slot.entity = None;
                slot.generation += 1;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0 as usize)?.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0 as usize)?.entity.as_mut()
    }

    /// Creates a weak reference to a live entity.
    pub fn weak_ref(&self, id: EntityId) -> Option<EntityRef> {
        let slot = self.slots.get(id.0 as usize)?;
        slot.entity.as_ref()?;
        Some(EntityRef {
            id,
            generation: slot.generation,
        })
    }

    /// Resolves a weak reference; `None` once the entity despawned or the slot
    /// was reused.
    pub fn resolve(&self, entity_ref: EntityRef) -> Option<&Entity> {
        let slot = self.slots.get(entity_ref.id.0 as usize)?;
        if slot.generation != entity_ref.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn resolve_mut(&mut self, entity_ref: EntityRef) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(entity_ref.id.0 as usize)?;
        if slot.generation != entity_ref.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    /// True while the reference resolves to an entity that is neither injured,
    /// destroyed, nor contained inside another entity.
    pub fn is_valid_target(&self, entity_ref: EntityRef) -> bool {
        match self.resolve(entity_ref) {
            Some(entity) => entity.health.is_intact() && entity.contained_in.is_none(),
            None => false,
        }
    }

    /// Applies a damage fraction, flipping the injured/destroyed flag when
    /// health bottoms out. No-op against invincible entities.
    pub fn apply_damage(&mut self, id: EntityId, fraction: f32) {
        let Some(entity) = self.get_mut(id) else {
            return;
        };
        if entity.invincible {
            return;
        }
        entity.health.fraction = (entity.health.fraction - fraction).max(0.0);
        if entity.health.fraction <= 0.0 {
            match entity.kind {
                EntityKind::Vehicle => entity.health.destroyed = true,
                _ => entity.health.injured = true,
            }
        }
    }

    /// Iterates over live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((EntityId(index as u32), slot.entity.as_ref()?)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entity.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn stale_ref_stops_resolving_after_despawn() {
        let mut scene = Scene::new();
        let id = scene.spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        let weak = scene.weak_ref(id).unwrap();

        assert!(scene.resolve(weak).is_some());
        assert!(scene.despawn(id));
        assert!(scene.resolve(weak).is_none());
    }

    #[test]
    fn reused_slot_does_not_satisfy_old_ref() {
        let mut scene = Scene::new();
        let id = scene.spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        let weak = scene.weak_ref(id).unwrap();
        scene.despawn(id);

        // Slot gets reused by the next spawn.
        let reused = scene.spawn(EntityKind::Vehicle, Transform::at(Vec3::ONE));
        assert_eq!(reused, id);
        assert!(scene.resolve(weak).is_none());
        assert!(scene.weak_ref(reused).is_some());
    }

    #[test]
    fn injured_person_is_no_longer_a_valid_target() {
        let mut scene = Scene::new();
        let id = scene.spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        let weak = scene.weak_ref(id).unwrap();
        assert!(scene.is_valid_target(weak));

        scene.apply_damage(id, 1.0);
        assert!(!scene.is_valid_target(weak));
        assert!(scene.get(id).unwrap().health.injured);
    }

    #[test]
    fn invincible_entity_ignores_damage() {
        let mut scene = Scene::new();
        let id = scene.spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        scene.get_mut(id).unwrap().invincible = true;

        scene.apply_damage(id, 1.0);
        assert!(scene.get(id).unwrap().health.is_intact());
    }
}
