use std::time::Duration;

use crate::action::{ActionStep, ActionUpdate, RunContext};
use crate::config::WeaponConfiguration;
use crate::events::Notification;
use crate::world::{EntityId, EntityKind, EntityRef, World, ground_distance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShootState {
    Init,
    Aim,
    FinishShoot,
    Done,
}

/// Fires at a stationary-enough target until it goes down or the configured
/// shot budget runs out.
///
/// One cycle is Init -> Aim -> FinishShoot; the shot itself (damage, muzzle
/// flash, gunshot notification) happens exactly once at the Aim ->
/// FinishShoot transition. The captured target is revalidated at the top of
/// every tick; an invalid or out-of-range target forces the terminal state in
/// the same tick so the terminal branch still runs.
pub struct ShootAction {
    shooter: EntityId,
    target: EntityRef,
    weapon: WeaponConfiguration,
    state: ShootState,
    shots_fired: u32,
    timer: Duration,
}

impl ShootAction {
    pub fn new(shooter: EntityId, target: EntityRef, weapon: WeaponConfiguration) -> Self {
        Self {
            shooter,
            target,
            weapon,
            state: ShootState::Init,
            shots_fired: 0,
            timer: Duration::ZERO,
        }
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    fn target_in_range(&self, world: &World) -> bool {
        let Some(shooter) = world.scene.get(self.shooter) else {
            return false;
        };
        let Some(target) = world.scene.resolve(self.target) else {
            return false;
        };
        ground_distance(shooter.transform.position, target.transform.position)
            <= self.weapon.shoot_range
    }

    fn fire(&mut self, world: &mut World) {
        let target_id = self.target.id;
        let damage = match world.scene.resolve(self.target).map(|entity| entity.kind) {
            Some(EntityKind::Vehicle) => self.weapon.vehicle_damage,
            _ => self.weapon.health_damage,
        };
        world.hooks.publish(Notification::MuzzleFlash {
            shooter: self.shooter,
        });
        world.scene.apply_damage(target_id, damage);
        world.hooks.publish(Notification::GunShot {
            shooter: self.shooter,
            target: target_id,
        });
        self.shots_fired += 1;
    }
}

impl ActionStep for ShootAction {
    fn name(&self) -> &'static str {
        "shoot"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world.scene.get(self.shooter).is_some() && world.scene.is_valid_target(self.target)
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        // Target gone, downed, or out of reach: jump to the terminal state
        // this tick instead of returning early.
        if self.state != ShootState::Done
            && (!world.scene.is_valid_target(self.target) || !self.target_in_range(world))
        {
            self.state = ShootState::Done;
        }

        loop {
            match self.state {
                ShootState::Init => {
                    self.timer = self.weapon.aim_time;
                    self.state = ShootState::Aim;
                    break ActionUpdate::Continue;
                }
                ShootState::Aim => {
                    self.timer = self.timer.saturating_sub(ctx.clock.delta);
                    if self.timer.is_zero() {
                        // Veto hooks get the last word on the pending shot;
                        // a protected target ends the action unharmed.
                        let pending = Notification::GunShot {
                            shooter: self.shooter,
                            target: self.target.id,
                        };
                        if world.hooks.is_vetoed(&pending) {
                            self.state = ShootState::Done;
                            continue;
                        }
                        self.fire(world);
                        self.timer = self.weapon.wait_after_shot;
                        self.state = ShootState::FinishShoot;
                    }
                    break ActionUpdate::Continue;
                }
                ShootState::FinishShoot => {
                    self.timer = self.timer.saturating_sub(ctx.clock.delta);
                    if !self.timer.is_zero() {
                        break ActionUpdate::Continue;
                    }
                    let budget_spent =
                        self.weapon.max_shots > 0 && self.shots_fired >= self.weapon.max_shots;
                    if budget_spent || !world.scene.is_valid_target(self.target) {
                        self.state = ShootState::Done;
                        continue;
                    }
                    self.timer = self.weapon.aim_time;
                    self.state = ShootState::Aim;
                    break ActionUpdate::Continue;
                }
                ShootState::Done => break ActionUpdate::Done,
            }
        }
    }
}
