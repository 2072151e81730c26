//! Entity scene, weak handles, transforms, oracles, and the simulation clock.
mod clock;
mod handle;
mod oracle;
mod transform;

use std::collections::HashMap;

pub use clock::SimClock;
pub use handle::{Entity, EntityId, EntityKind, EntityRef, Health, Scene};
pub use oracle::{
    CollisionOracle, Env, FlatTerrain, GroundArea, GroundSample, OracleError, StaticColliders,
    TerrainOracle,
};
pub use transform::{Transform, ground_distance};

use crate::component::BarrierTapeComponent;
use crate::events::Hooks;

/// Mutable gameplay state: the entity scene, attached components, and the
/// notification hook lists.
///
/// Components live beside the scene rather than inside it so their mutators
/// can spawn and despawn the sub-entities they own.
#[derive(Default)]
pub struct World {
    pub scene: Scene,
    pub tapes: HashMap<EntityId, BarrierTapeComponent>,
    pub hooks: Hooks,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an empty barrier-tape component to `owner`, returning the
    /// existing one untouched if already attached.
    pub fn attach_tape(&mut self, owner: EntityId) -> &mut BarrierTapeComponent {
        self.tapes
            .entry(owner)
            .or_insert_with(|| BarrierTapeComponent::new(owner))
    }

    pub fn tape(&self, owner: EntityId) -> Option<&BarrierTapeComponent> {
        self.tapes.get(&owner)
    }

    pub fn tape_mut(&mut self, owner: EntityId) -> Option<&mut BarrierTapeComponent> {
        self.tapes.get_mut(&owner)
    }

    /// Detaches and shuts down the barrier-tape component, despawning every
    /// sub-entity it created. Returns false if none was attached.
    pub fn remove_tape(&mut self, owner: EntityId) -> bool {
        match self.tapes.remove(&owner) {
            Some(mut tape) => {
                tape.shutdown(&mut self.scene);
                true
            }
            None => false,
        }
    }
}
