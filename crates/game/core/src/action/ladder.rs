use std::f32::consts::{PI, TAU};
use std::time::Duration;

use glam::Vec3;

use crate::action::{ActionStep, ActionUpdate, RunContext};
use crate::world::{EntityId, World};

/// Shortest signed angular difference from `from` to `to`, in radians.
fn angle_to(from: f32, to: f32) -> f32 {
    (to - from + PI).rem_euclid(TAU) - PI
}

/// Bearing from a position toward a target on the ground plane.
fn bearing(from: Vec3, to: Vec3) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

const ALIGN_TOLERANCE: f32 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeployState {
    Init,
    ExtendLegs,
    Align,
    Done,
}

/// Extends a DLK vehicle's support legs, turns the rig toward the rescue
/// target, and raises the ladder.
///
/// Interruption before the ladder is up retracts the legs again in
/// `shutdown`; a completed deploy leaves the rig standing for
/// [`LadderUndeployAction`] to fold.
pub struct LadderDeployAction {
    vehicle: EntityId,
    target: Vec3,
    state: DeployState,
    timer: Duration,
    deployed: bool,
}

impl LadderDeployAction {
    pub fn new(vehicle: EntityId, target: Vec3) -> Self {
        Self {
            vehicle,
            target,
            state: DeployState::Init,
            timer: Duration::ZERO,
            deployed: false,
        }
    }
}

impl ActionStep for LadderDeployAction {
    fn name(&self) -> &'static str {
        "ladder_deploy"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world
            .scene
            .get(self.vehicle)
            .is_some_and(|vehicle| !vehicle.ladder_deployed && vehicle.health.is_intact())
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        if self.state != DeployState::Done && world.scene.get(self.vehicle).is_none() {
            self.state = DeployState::Done;
        }

        loop {
            match self.state {
                DeployState::Init => {
                    self.timer = ctx.specs.ladder.extend_legs_time;
                    self.state = DeployState::ExtendLegs;
                    break ActionUpdate::Continue;
                }
                DeployState::ExtendLegs => {
                    self.timer = self.timer.saturating_sub(ctx.clock.delta);
                    if self.timer.is_zero() {
                        if let Some(vehicle) = world.scene.get_mut(self.vehicle) {
                            vehicle.support_legs_extended = true;
                        }
                        self.state = DeployState::Align;
                    }
                    break ActionUpdate::Continue;
                }
                DeployState::Align => {
                    let Some(vehicle) = world.scene.get_mut(self.vehicle) else {
                        self.state = DeployState::Done;
                        continue;
                    };
                    let desired = bearing(vehicle.transform.position, self.target);
                    let diff = angle_to(vehicle.transform.yaw, desired);
                    if diff.abs() <= ALIGN_TOLERANCE {
                        vehicle.ladder_deployed = true;
                        self.deployed = true;
                        self.state = DeployState::Done;
                        continue;
                    }
                    let step = ctx.specs.ladder.align_speed * ctx.clock.delta_seconds();
                    vehicle.transform.yaw += diff.clamp(-step, step);
                    break ActionUpdate::Continue;
                }
                DeployState::Done => break ActionUpdate::Done,
            }
        }
    }

    fn shutdown(&mut self, world: &mut World, _ctx: &RunContext<'_>) {
        // An interrupted deploy must not leave the legs out.
        if !self.deployed {
            if let Some(vehicle) = world.scene.get_mut(self.vehicle) {
                vehicle.support_legs_extended = false;
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UndeployState {
    Init,
    FoldLadder,
    RetractLegs,
    Done,
}

/// Folds the ladder and retracts the support legs.
pub struct LadderUndeployAction {
    vehicle: EntityId,
    state: UndeployState,
    timer: Duration,
}

impl LadderUndeployAction {
    pub fn new(vehicle: EntityId) -> Self {
        Self {
            vehicle,
            state: UndeployState::Init,
            timer: Duration::ZERO,
        }
    }
}

impl ActionStep for LadderUndeployAction {
    fn name(&self) -> &'static str {
        "ladder_undeploy"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world
            .scene
            .get(self.vehicle)
            .is_some_and(|vehicle| vehicle.ladder_deployed)
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        if self.state != UndeployState::Done && world.scene.get(self.vehicle).is_none() {
            self.state = UndeployState::Done;
        }

        loop {
            match self.state {
                UndeployState::Init => {
                    self.timer = ctx.specs.ladder.fold_time;
                    self.state = UndeployState::FoldLadder;
                    break ActionUpdate::Continue;
                }
                UndeployState::FoldLadder => {
                    self.timer = self.timer.saturating_sub(ctx.clock.delta);
                    if self.timer.is_zero() {
                        if let Some(vehicle) = world.scene.get_mut(self.vehicle) {
                            vehicle.ladder_deployed = false;
                        }
                        self.timer = ctx.specs.ladder.extend_legs_time;
                        self.state = UndeployState::RetractLegs;
                    }
                    break ActionUpdate::Continue;
                }
                UndeployState::RetractLegs => {
                    self.timer = self.timer.saturating_sub(ctx.clock.delta);
                    if self.timer.is_zero() {
                        if let Some(vehicle) = world.scene.get_mut(self.vehicle) {
                            vehicle.support_legs_extended = false;
                        }
                        self.state = UndeployState::Done;
                        continue;
                    }
                    break ActionUpdate::Continue;
                }
                UndeployState::Done => break ActionUpdate::Done,
            }
        }
    }
}
