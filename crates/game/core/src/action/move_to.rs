use glam::Vec3;

use crate::action::{ActionStep, ActionUpdate, RunContext};
use crate::world::{EntityId, EntityRef, World, ground_distance};

/// Where a movement leg ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveGoal {
    /// A fixed point; arrival within the configured tolerance.
    Point(Vec3),
    /// Chase an entity until within `stop_distance` of it.
    Entity {
        target: EntityRef,
        stop_distance: f32,
    },
}

/// Straight-line movement toward a goal.
///
/// The host's pathfinding is not modeled; this closes distance on the ground
/// plane at the configured walk/run speed and snaps the mover to the terrain
/// each step. A vanished chase target ends the move.
pub struct MoveToAction {
    mover: EntityId,
    goal: MoveGoal,
    run: bool,
}

impl MoveToAction {
    pub fn new(mover: EntityId, goal: MoveGoal) -> Self {
        Self {
            mover,
            goal,
            run: false,
        }
    }

    pub fn running(mut self) -> Self {
        self.run = true;
        self
    }

    fn goal_point(&self, world: &World) -> Option<(Vec3, f32)> {
        match self.goal {
            MoveGoal::Point(point) => Some((point, 0.0)),
            MoveGoal::Entity {
                target,
                stop_distance,
            } => {
                let entity = world.scene.resolve(target)?;
                Some((entity.transform.position, stop_distance))
            }
        }
    }
}

impl ActionStep for MoveToAction {
    fn name(&self) -> &'static str {
        "move_to"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world.scene.get(self.mover).is_some()
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        let Some((goal, stop_distance)) = self.goal_point(world) else {
            return ActionUpdate::Done;
        };
        let Some(mover) = world.scene.get(self.mover) else {
            return ActionUpdate::Done;
        };

        let position = mover.transform.position;
        let tolerance = stop_distance.max(ctx.specs.movement.arrive_tolerance);
        let distance = ground_distance(position, goal);
        if distance <= tolerance {
            return ActionUpdate::Done;
        }

        let speed = if self.run {
            ctx.specs.movement.run_speed
        } else {
            ctx.specs.movement.walk_speed
        };
        let step = (speed * ctx.clock.delta_seconds()).min(distance - tolerance);
        let direction =
            Vec3::new(goal.x - position.x, 0.0, goal.z - position.z).normalize_or_zero();
        let mut next = position + direction * step;
        if let Ok(terrain) = ctx.env.terrain() {
            next.y = terrain.ground_height(next.x, next.z);
        }

        if let Some(mover) = world.scene.get_mut(self.mover) {
            mover.transform.position = next;
        }
        ActionUpdate::Continue
    }
}
