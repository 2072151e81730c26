use crate::action::{
    ActionStep, ActionUpdate, MoveGoal, MoveToAction, RunContext, ShootAction,
};
use crate::config::WeaponConfiguration;
use crate::events::Notification;
use crate::world::{EntityId, EntityRef, World, ground_distance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HuntState {
    Init,
    Pursue,
    AwaitShot,
    Done,
}

/// Chases a fleeing target and shoots once in range.
///
/// Out-of-range targets trigger a [`MoveToAction`] child at the front of the
/// queue; the shot itself is delegated to a [`ShootAction`] driven inline so
/// the shot tally survives across cycles: a target slipping out of weapon
/// range mid-cycle resumes the pursuit with the remaining budget instead of
/// ending the hunt. The pursuit is abandoned with a target-escaped hint once
/// the distance exceeds the tunable give-up threshold, compared every tick
/// against the live spec value.
pub struct HuntAndShootAction {
    hunter: EntityId,
    target: EntityRef,
    weapon: WeaponConfiguration,
    state: HuntState,
    escaped: bool,
    /// Shots fired across all shoot cycles so far.
    fired: u32,
    shooting: Option<ShootAction>,
}

impl HuntAndShootAction {
    pub fn new(hunter: EntityId, target: EntityRef, weapon: WeaponConfiguration) -> Self {
        Self {
            hunter,
            target,
            weapon,
            state: HuntState::Init,
            escaped: false,
            fired: 0,
            shooting: None,
        }
    }

    fn target_distance(&self, world: &World) -> Option<f32> {
        let hunter = world.scene.get(self.hunter)?;
        let target = world.scene.resolve(self.target)?;
        Some(ground_distance(
            hunter.transform.position,
            target.transform.position,
        ))
    }

    /// Weapon handed to one shoot cycle: the remaining budget for bounded
    /// weapons, untouched for unlimited ones.
    fn cycle_weapon(&self) -> WeaponConfiguration {
        if self.weapon.max_shots == 0 {
            self.weapon
        } else {
            self.weapon
                .with_max_shots(self.weapon.max_shots - self.fired)
        }
    }

    fn budget_spent(&self) -> bool {
        self.weapon.max_shots > 0 && self.fired >= self.weapon.max_shots
    }
}

impl ActionStep for HuntAndShootAction {
    fn name(&self) -> &'static str {
        "hunt_and_shoot"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world.scene.get(self.hunter).is_some() && world.scene.is_valid_target(self.target)
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        if self.state != HuntState::Done {
            if !world.scene.is_valid_target(self.target) {
                // Downed or despawned targets end the hunt without a hint.
                self.state = HuntState::Done;
            } else if let Some(distance) = self.target_distance(world) {
                if distance > ctx.specs.pursuit.give_up_distance {
                    self.escaped = true;
                    self.state = HuntState::Done;
                }
            } else {
                self.state = HuntState::Done;
            }
        }

        loop {
            match self.state {
                HuntState::Init => {
                    self.state = HuntState::Pursue;
                    continue;
                }
                HuntState::Pursue => {
                    let Some(distance) = self.target_distance(world) else {
                        self.state = HuntState::Done;
                        continue;
                    };
                    let hold_distance =
                        self.weapon.shoot_range * ctx.specs.pursuit.approach_factor;
                    if distance <= self.weapon.shoot_range {
                        let mut shoot =
                            ShootAction::new(self.hunter, self.target, self.cycle_weapon());
                        if !shoot.startup(world, ctx) {
                            self.state = HuntState::Done;
                            continue;
                        }
                        self.shooting = Some(shoot);
                        self.state = HuntState::AwaitShot;
                        continue;
                    }
                    break ActionUpdate::Push(Box::new(
                        MoveToAction::new(
                            self.hunter,
                            MoveGoal::Entity {
                                target: self.target,
                                stop_distance: hold_distance,
                            },
                        )
                        .running()
                        .into(),
                    ));
                }
                HuntState::AwaitShot => {
                    let Some(mut shoot) = self.shooting.take() else {
                        self.state = HuntState::Pursue;
                        continue;
                    };
                    if !matches!(shoot.update(world, ctx), ActionUpdate::Done) {
                        self.shooting = Some(shoot);
                        break ActionUpdate::Continue;
                    }
                    // The cycle ended: tally its shots and either stop on a
                    // spent budget or go back to closing the distance.
                    self.fired += shoot.shots_fired();
                    self.state = if self.budget_spent() {
                        HuntState::Done
                    } else {
                        HuntState::Pursue
                    };
                    continue;
                }
                HuntState::Done => {
                    if self.escaped {
                        self.escaped = false;
                        world.hooks.publish(Notification::TargetEscaped {
                            pursuer: self.hunter,
                            target: self.target.id,
                        });
                    }
                    break ActionUpdate::Done;
                }
            }
        }
    }
}
