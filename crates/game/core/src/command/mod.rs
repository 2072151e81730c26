//! One-shot requests that validate preconditions and queue actions.
//!
//! A command never fails loudly: rejected caller or context checks simply
//! queue nothing, and the caller's current plan survives when it outranks the
//! request.

use glam::Vec3;

use crate::action::{
    ActionPriority, ActionQueue, HuntAndShootAction, LadderDeployAction, LadderUndeployAction,
    PlaceBarrierPoleAction, RedirectTrafficAction, RunContext, ShootAction,
};
use crate::config::WeaponConfiguration;
use crate::placement::PoleIndex;
use crate::world::{EntityId, EntityRef, World};

/// Validation and execution surface shared by every command.
pub trait Command {
    fn name(&self) -> &'static str;

    fn priority(&self) -> ActionPriority {
        ActionPriority::NORMAL
    }

    /// May this caller issue the command at all?
    fn check_caller(&self, world: &World, caller: EntityId) -> bool;

    /// Is the command meaningful against the current world state?
    fn check_context(&self, world: &World, ctx: &RunContext<'_>) -> bool;

    /// Pushes the command's actions. Only called after both checks passed
    /// and the queue accepted the preemption.
    fn execute(
        &self,
        caller: EntityId,
        world: &mut World,
        queue: &mut ActionQueue,
        ctx: &RunContext<'_>,
    );
}

/// Runs a command through checks, preemption, and execution. Returns true
/// iff actions were queued.
pub fn dispatch(
    command: &dyn Command,
    caller: EntityId,
    world: &mut World,
    queue: &mut ActionQueue,
    ctx: &RunContext<'_>,
) -> bool {
    if !command.check_caller(world, caller) || !command.check_context(world, ctx) {
        return false;
    }
    if !queue.preempt(command.priority(), world, ctx) {
        return false;
    }
    command.execute(caller, world, queue, ctx);
    true
}

fn caller_can_act(world: &World, caller: EntityId) -> bool {
    world
        .scene
        .get(caller)
        .is_some_and(|entity| entity.health.is_intact() && entity.contained_in.is_none())
}

/// Fire at a target that is already within weapon range.
pub struct ShootCommand {
    pub target: EntityRef,
    pub weapon: WeaponConfiguration,
}

impl Command for ShootCommand {
    fn name(&self) -> &'static str {
        "shoot"
    }

    fn check_caller(&self, world: &World, caller: EntityId) -> bool {
        caller_can_act(world, caller)
    }

    fn check_context(&self, world: &World, _ctx: &RunContext<'_>) -> bool {
        world.scene.is_valid_target(self.target)
    }

    fn execute(
        &self,
        caller: EntityId,
        _world: &mut World,
        queue: &mut ActionQueue,
        _ctx: &RunContext<'_>,
    ) {
        queue.push(
            ShootAction::new(caller, self.target, self.weapon),
            self.priority(),
        );
    }
}

/// Chase down a fleeing target and shoot it.
pub struct HuntAndShootCommand {
    pub target: EntityRef,
    pub weapon: WeaponConfiguration,
}

impl Command for HuntAndShootCommand {
    fn name(&self) -> &'static str {
        "hunt_and_shoot"
    }

    fn check_caller(&self, world: &World, caller: EntityId) -> bool {
        caller_can_act(world, caller)
    }

    fn check_context(&self, world: &World, _ctx: &RunContext<'_>) -> bool {
        world.scene.is_valid_target(self.target)
    }

    fn execute(
        &self,
        caller: EntityId,
        _world: &mut World,
        queue: &mut ActionQueue,
        _ctx: &RunContext<'_>,
    ) {
        queue.push(
            HuntAndShootAction::new(caller, self.target, self.weapon),
            self.priority(),
        );
    }
}

/// Plant one barrier pole at the given position.
pub struct PlaceBarrierCommand {
    pub index: PoleIndex,
    pub position: Vec3,
}

impl Command for PlaceBarrierCommand {
    fn name(&self) -> &'static str {
        "place_barrier"
    }

    fn check_caller(&self, world: &World, caller: EntityId) -> bool {
        caller_can_act(world, caller)
    }

    fn check_context(&self, _world: &World, ctx: &RunContext<'_>) -> bool {
        // The action re-validates the exact position every move; here it is
        // enough that terrain queries exist at all.
        ctx.env.terrain().is_ok()
    }

    fn execute(
        &self,
        caller: EntityId,
        world: &mut World,
        queue: &mut ActionQueue,
        _ctx: &RunContext<'_>,
    ) {
        world.attach_tape(caller);
        queue.push(
            PlaceBarrierPoleAction::new(caller, self.index, self.position),
            self.priority(),
        );
    }
}

/// Start waving traffic away from the caller's position.
pub struct RedirectTrafficCommand;

impl Command for RedirectTrafficCommand {
    fn name(&self) -> &'static str {
        "redirect_traffic"
    }

    fn check_caller(&self, world: &World, caller: EntityId) -> bool {
        caller_can_act(world, caller)
    }

    fn check_context(&self, _world: &World, _ctx: &RunContext<'_>) -> bool {
        true
    }

    fn execute(
        &self,
        caller: EntityId,
        _world: &mut World,
        queue: &mut ActionQueue,
        _ctx: &RunContext<'_>,
    ) {
        queue.push(RedirectTrafficAction::new(caller), self.priority());
    }
}

/// Deploy the DLK ladder toward a rescue target.
pub struct DeployLadderCommand {
    pub target: Vec3,
}

impl Command for DeployLadderCommand {
    fn name(&self) -> &'static str {
        "deploy_ladder"
    }

    fn priority(&self) -> ActionPriority {
        // A rig mid-rescue must not be preempted by ordinary orders.
        ActionPriority::BLOCKING
    }

    fn check_caller(&self, world: &World, caller: EntityId) -> bool {
        world
            .scene
            .get(caller)
            .is_some_and(|vehicle| vehicle.health.is_intact() && !vehicle.ladder_deployed)
    }

    fn check_context(&self, _world: &World, _ctx: &RunContext<'_>) -> bool {
        true
    }

    fn execute(
        &self,
        caller: EntityId,
        _world: &mut World,
        queue: &mut ActionQueue,
        _ctx: &RunContext<'_>,
    ) {
        queue.push(LadderDeployAction::new(caller, self.target), self.priority());
    }
}

/// Fold the DLK ladder back up.
pub struct UndeployLadderCommand;

impl Command for UndeployLadderCommand {
    fn name(&self) -> &'static str {
        "undeploy_ladder"
    }

    fn priority(&self) -> ActionPriority {
        ActionPriority::BLOCKING
    }

    fn check_caller(&self, world: &World, caller: EntityId) -> bool {
        world
            .scene
            .get(caller)
            .is_some_and(|vehicle| vehicle.ladder_deployed)
    }

    fn check_context(&self, _world: &World, _ctx: &RunContext<'_>) -> bool {
        true
    }

    fn execute(
        &self,
        caller: EntityId,
        _world: &mut World,
        queue: &mut ActionQueue,
        _ctx: &RunContext<'_>,
    ) {
        queue.push(LadderUndeployAction::new(caller), self.priority());
    }
}
