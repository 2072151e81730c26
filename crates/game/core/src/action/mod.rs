//! Action domain - per-tick resumable behavior units.
//!
//! An action is a small state machine polled once per simulation tick. The
//! queue calls `startup` once (returning false rejects the action before its
//! first tick), then `update` every tick until it reports [`ActionUpdate::Done`]
//! or [`ActionUpdate::ClearList`], and finally `shutdown` exactly once on
//! removal for any reason. "Waiting" is expressed as state kept across
//! re-entries, never as a blocked call.
//!
//! Concrete actions live in their own modules and are wrapped by the closed
//! [`Action`] enum, dispatched by match.

mod hunt_and_shoot;
mod ladder;
mod move_to;
mod place_barrier_pole;
mod queue;
mod redirect_traffic;
mod shoot;

pub use hunt_and_shoot::HuntAndShootAction;
pub use ladder::{LadderDeployAction, LadderUndeployAction};
pub use move_to::{MoveGoal, MoveToAction};
pub use place_barrier_pole::PlaceBarrierPoleAction;
pub use queue::ActionQueue;
pub use redirect_traffic::RedirectTrafficAction;
pub use shoot::ShootAction;

use crate::config::Specs;
use crate::world::{Env, SimClock, World};

/// Read-only context handed into every lifecycle call.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub env: Env<'a>,
    pub specs: &'a Specs,
    pub clock: SimClock,
}

/// Queue priority of an action or command. Higher values preempt lower ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionPriority(pub u32);

impl ActionPriority {
    /// Idle behavior injected by automatisms.
    pub const AUTOMATISM: Self = Self(10);
    /// Player-issued orders.
    pub const NORMAL: Self = Self(50);
    /// Must-run behavior that refuses preemption by ordinary orders.
    pub const BLOCKING: Self = Self(100);
}

/// Verdict returned from one `update` poll.
pub enum ActionUpdate {
    /// Keep polling next tick.
    Continue,
    /// Insert a child action at the front of the queue; the child runs to
    /// completion before this action is polled again.
    Push(Box<Action>),
    /// Remove this action from the queue.
    Done,
    /// Abort the entire remaining queue, this action included.
    ClearList,
}

/// Lifecycle implemented by every concrete action.
pub trait ActionStep {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Runs exactly once before the first tick. Returning false rejects the
    /// action: it is discarded without ever being updated or shut down.
    fn startup(&mut self, world: &mut World, ctx: &RunContext<'_>) -> bool {
        let _ = (world, ctx);
        true
    }

    /// Polled once per simulation tick.
    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate;

    /// Runs exactly once when the action leaves the queue, whether it
    /// completed, was invalidated, or the plan was cleared.
    fn shutdown(&mut self, world: &mut World, ctx: &RunContext<'_>) {
        let _ = (world, ctx);
    }
}

/// Closed set of action variants.
pub enum Action {
    Shoot(ShootAction),
    HuntAndShoot(HuntAndShootAction),
    MoveTo(MoveToAction),
    PlaceBarrierPole(PlaceBarrierPoleAction),
    RedirectTraffic(RedirectTrafficAction),
    LadderDeploy(LadderDeployAction),
    LadderUndeploy(LadderUndeployAction),
    #[cfg(test)]
    Scripted(scripted::ScriptedAction),
}

impl ActionStep for Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Shoot(action) => action.name(),
            Action::HuntAndShoot(action) => action.name(),
            Action::MoveTo(action) => action.name(),
            Action::PlaceBarrierPole(action) => action.name(),
            Action::RedirectTraffic(action) => action.name(),
            Action::LadderDeploy(action) => action.name(),
            Action::LadderUndeploy(action) => action.name(),
            #[cfg(test)]
            Action::Scripted(action) => action.name(),
        }
    }

    fn startup(&mut self, world: &mut World, ctx: &RunContext<'_>) -> bool {
        match self {
            Action::Shoot(action) => action.startup(world, ctx),
            Action::HuntAndShoot(action) => action.startup(world, ctx),
            Action::MoveTo(action) => action.startup(world, ctx),
            Action::PlaceBarrierPole(action) => action.startup(world, ctx),
            Action::RedirectTraffic(action) => action.startup(world, ctx),
            Action::LadderDeploy(action) => action.startup(world, ctx),
            Action::LadderUndeploy(action) => action.startup(world, ctx),
            #[cfg(test)]
            Action::Scripted(action) => action.startup(world, ctx),
        }
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        match self {
            Action::Shoot(action) => action.update(world, ctx),
            Action::HuntAndShoot(action) => action.update(world, ctx),
            Action::MoveTo(action) => action.update(world, ctx),
            Action::PlaceBarrierPole(action) => action.update(world, ctx),
            Action::RedirectTraffic(action) => action.update(world, ctx),
            Action::LadderDeploy(action) => action.update(world, ctx),
            Action::LadderUndeploy(action) => action.update(world, ctx),
            #[cfg(test)]
            Action::Scripted(action) => action.update(world, ctx),
        }
    }

    fn shutdown(&mut self, world: &mut World, ctx: &RunContext<'_>) {
        match self {
            Action::Shoot(action) => action.shutdown(world, ctx),
            Action::HuntAndShoot(action) => action.shutdown(world, ctx),
            Action::MoveTo(action) => action.shutdown(world, ctx),
            Action::PlaceBarrierPole(action) => action.shutdown(world, ctx),
            Action::RedirectTraffic(action) => action.shutdown(world, ctx),
            Action::LadderDeploy(action) => action.shutdown(world, ctx),
            Action::LadderUndeploy(action) => action.shutdown(world, ctx),
            #[cfg(test)]
            Action::Scripted(action) => action.shutdown(world, ctx),
        }
    }
}

impl From<ShootAction> for Action {
    fn from(action: ShootAction) -> Self {
        Self::Shoot(action)
    }
}

impl From<HuntAndShootAction> for Action {
    fn from(action: HuntAndShootAction) -> Self {
        Self::HuntAndShoot(action)
    }
}

impl From<MoveToAction> for Action {
    fn from(action: MoveToAction) -> Self {
        Self::MoveTo(action)
    }
}

impl From<PlaceBarrierPoleAction> for Action {
    fn from(action: PlaceBarrierPoleAction) -> Self {
        Self::PlaceBarrierPole(action)
    }
}

impl From<RedirectTrafficAction> for Action {
    fn from(action: RedirectTrafficAction) -> Self {
        Self::RedirectTraffic(action)
    }
}

impl From<LadderDeployAction> for Action {
    fn from(action: LadderDeployAction) -> Self {
        Self::LadderDeploy(action)
    }
}

impl From<LadderUndeployAction> for Action {
    fn from(action: LadderUndeployAction) -> Self {
        Self::LadderUndeploy(action)
    }
}

#[cfg(test)]
impl From<scripted::ScriptedAction> for Action {
    fn from(action: scripted::ScriptedAction) -> Self {
        Self::Scripted(action)
    }
}
