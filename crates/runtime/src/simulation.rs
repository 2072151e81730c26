use std::collections::BTreeMap;
use std::time::Duration;

use cordon_core::{
    ActionQueue, Command, CollisionOracle, EntityId, Env, RunContext, SimClock, Specs,
    TerrainOracle, World, dispatch,
};

/// Single-threaded tick driver for one simulated scene.
///
/// Owns the world, the designer specs, the oracles, and one action queue per
/// acting entity. Everything runs on the caller's thread: commands are
/// validated and queued synchronously, and [`Simulation::tick`] polls every
/// queue once in entity-id order. There is no ordering guarantee between
/// entities beyond that, only that each entity's own queue is serial.
pub struct Simulation {
    world: World,
    specs: Specs,
    clock: SimClock,
    queues: BTreeMap<EntityId, ActionQueue>,
    terrain: Option<Box<dyn TerrainOracle>>,
    colliders: Option<Box<dyn CollisionOracle>>,
}

impl Simulation {
    pub fn new(specs: Specs) -> Self {
        Self {
            world: World::new(),
            specs,
            clock: SimClock::new(),
            queues: BTreeMap::new(),
            terrain: None,
            colliders: None,
        }
    }

    pub fn with_terrain(mut self, terrain: impl TerrainOracle + 'static) -> Self {
        self.terrain = Some(Box::new(terrain));
        self
    }

    pub fn with_colliders(mut self, colliders: impl CollisionOracle + 'static) -> Self {
        self.colliders = Some(Box::new(colliders));
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn specs(&self) -> &Specs {
        &self.specs
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn queue(&self, entity: EntityId) -> Option<&ActionQueue> {
        self.queues.get(&entity)
    }

    /// True once no entity has pending actions.
    pub fn idle(&self) -> bool {
        self.queues.values().all(ActionQueue::is_empty)
    }

    /// Runs a command through validation and, if accepted, queues its
    /// actions on the caller's queue. Rejected commands queue nothing.
    pub fn issue(&mut self, caller: EntityId, command: &dyn Command) -> bool {
        let ctx = RunContext {
            env: Env::new(self.terrain.as_deref(), self.colliders.as_deref()),
            specs: &self.specs,
            clock: self.clock,
        };
        let queue = self.queues.entry(caller).or_default();
        let queued = dispatch(command, caller, &mut self.world, queue, &ctx);
        if queued {
            tracing::debug!(%caller, command = command.name(), "command queued");
        } else {
            tracing::debug!(%caller, command = command.name(), "command rejected");
        }
        queued
    }

    /// Advances the clock and polls every entity's front action once.
    pub fn tick(&mut self, delta: Duration) {
        self.clock.advance(delta);
        let ctx = RunContext {
            env: Env::new(self.terrain.as_deref(), self.colliders.as_deref()),
            specs: &self.specs,
            clock: self.clock,
        };
        for (entity, queue) in self.queues.iter_mut() {
            if let Some(action) = queue.current_action() {
                tracing::trace!(%entity, action, tick = ctx.clock.tick, "polling");
            }
            queue.update(&mut self.world, &ctx);
        }
        self.queues.retain(|_, queue| !queue.is_empty());
    }

    /// Discards an entity's whole plan; every started action still gets its
    /// shutdown call.
    pub fn abort_plan(&mut self, entity: EntityId) {
        let Some(mut queue) = self.queues.remove(&entity) else {
            return;
        };
        let ctx = RunContext {
            env: Env::new(self.terrain.as_deref(), self.colliders.as_deref()),
            specs: &self.specs,
            clock: self.clock,
        };
        queue.clear(&mut self.world, &ctx);
        tracing::debug!(%entity, "plan aborted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordon_core::{EntityKind, FlatTerrain, MoveGoal, MoveToAction, ActionPriority, Transform};
    use glam::Vec3;

    #[test]
    fn idle_queues_are_dropped_after_completion() {
        let mut sim = Simulation::new(Specs::default()).with_terrain(FlatTerrain::new(0.0));
        let walker = sim
            .world_mut()
            .scene
            .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));

        // Push directly; commands are exercised in the integration tests.
        sim.queues.entry(walker).or_default().push(
            MoveToAction::new(walker, MoveGoal::Point(Vec3::new(1.0, 0.0, 0.0))),
            ActionPriority::NORMAL,
        );

        for _ in 0..100 {
            sim.tick(Duration::from_millis(100));
            if sim.idle() {
                break;
            }
        }
        assert!(sim.idle());
        assert!(sim.queue(walker).is_none());
    }
}
