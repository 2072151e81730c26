use std::collections::HashMap;

use cordon_core::{BarrierTapeComponent, EntityId, TerrainOracle, World};
use cordon_net::{BarrierTapeDelta, BitReader, BitWriter, BitstreamError, DeltaItem, TapeApplyContext};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("malformed delta payload for {owner}: {source}")]
    Codec {
        owner: EntityId,
        source: BitstreamError,
    },
}

/// One encoded component update in flight from host to a peer.
#[derive(Clone, Debug)]
pub struct TapeUpdate {
    pub owner: EntityId,
    pub tick: u64,
    pub payload: Vec<u8>,
}

/// Host-side replication pump for every barrier tape in the world.
///
/// Holds one [`BarrierTapeDelta`] per replicated component for one peer; a
/// component seen for the first time gets a forced full sync, after that only
/// changed fields are shipped.
#[derive(Default)]
pub struct TapeHost {
    deltas: HashMap<EntityId, BarrierTapeDelta>,
}

impl TapeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs every live component against its shadow and encodes one update
    /// per component that changed. Call once per tick, after the simulation
    /// step and before the network send.
    pub fn poll(&mut self, world: &World, tick: u64) -> Vec<TapeUpdate> {
        let mut updates = Vec::new();
        for (owner, tape) in &world.tapes {
            let (delta, force) = match self.deltas.entry(*owner) {
                std::collections::hash_map::Entry::Occupied(entry) => (entry.into_mut(), false),
                std::collections::hash_map::Entry::Vacant(entry) => {
                    (entry.insert(BarrierTapeDelta::new()), true)
                }
            };
            let view = (tape, &world.scene);
            if force || delta.prepare_for_update(view) {
                let mut writer = BitWriter::new();
                delta.update_data(view, &mut writer, force);
                tracing::trace!(%owner, tick, bits = writer.bit_len(), force, "tape delta out");
                updates.push(TapeUpdate {
                    owner: *owner,
                    tick,
                    payload: writer.finish(),
                });
            }
        }
        // Shadow state for detached components is stale; forget it so a
        // re-attached component gets a fresh full sync.
        self.deltas.retain(|owner, _| world.tapes.contains_key(owner));
        updates
    }
}

/// Client-side replication endpoint.
///
/// Buffers decoded updates per component and applies them once the local
/// tick reaches each entry's host tick, strictly in tick order, through the
/// component's own mutators.
#[derive(Default)]
pub struct TapeClient {
    deltas: HashMap<EntityId, BarrierTapeDelta>,
}

impl TapeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes and buffers one received update. Live state is untouched
    /// until [`TapeClient::apply`] reaches the update's tick.
    pub fn receive(&mut self, update: &TapeUpdate) -> Result<(), RuntimeError> {
        let delta = self.deltas.entry(update.owner).or_default();
        delta
            .set_data(&mut BitReader::new(&update.payload), update.tick)
            .map_err(|source| RuntimeError::Codec {
                owner: update.owner,
                source,
            })
    }

    /// Applies every buffered update due at `tick`. Components are attached
    /// on first contact.
    pub fn apply(&mut self, world: &mut World, terrain: &dyn TerrainOracle, tick: u64) {
        let world = &mut *world;
        for (owner, delta) in self.deltas.iter_mut() {
            let tape = world
                .tapes
                .entry(*owner)
                .or_insert_with(|| BarrierTapeComponent::new(*owner));
            delta.interpolate(
                TapeApplyContext {
                    tape,
                    scene: &mut world.scene,
                    terrain,
                },
                tick,
            );
        }
    }
}
