use std::time::Duration;

use crate::action::{ActionStep, ActionUpdate, RunContext};
use crate::events::Notification;
use crate::world::{EntityId, EntityKind, World, ground_distance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RedirectState {
    Init,
    Redirect,
    Done,
}

/// Police officer waves approaching vehicles away from the cordoned area.
///
/// Runs for the tunable redirect duration, counted down with the clock's
/// elapsed time. Each intact vehicle inside the redirect radius is waved off
/// exactly once for the lifetime of the action.
pub struct RedirectTrafficAction {
    officer: EntityId,
    state: RedirectState,
    remaining: Duration,
    redirected: Vec<EntityId>,
}

impl RedirectTrafficAction {
    pub fn new(officer: EntityId) -> Self {
        Self {
            officer,
            state: RedirectState::Init,
            remaining: Duration::ZERO,
            redirected: Vec::new(),
        }
    }

    pub fn redirected_count(&self) -> usize {
        self.redirected.len()
    }
}

impl ActionStep for RedirectTrafficAction {
    fn name(&self) -> &'static str {
        "redirect_traffic"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world
            .scene
            .get(self.officer)
            .is_some_and(|officer| officer.health.is_intact())
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        if self.state != RedirectState::Done
            && !world
                .scene
                .get(self.officer)
                .is_some_and(|officer| officer.health.is_intact())
        {
            self.state = RedirectState::Done;
        }

        loop {
            match self.state {
                RedirectState::Init => {
                    self.remaining = ctx.specs.traffic.redirect_duration;
                    self.state = RedirectState::Redirect;
                    continue;
                }
                RedirectState::Redirect => {
                    self.remaining = self.remaining.saturating_sub(ctx.clock.delta);
                    let Some(officer_position) = world
                        .scene
                        .get(self.officer)
                        .map(|officer| officer.transform.position)
                    else {
                        self.state = RedirectState::Done;
                        continue;
                    };

                    let arrivals: Vec<EntityId> = world
                        .scene
                        .iter()
                        .filter(|(id, entity)| {
                            entity.kind == EntityKind::Vehicle
                                && entity.health.is_intact()
                                && !self.redirected.contains(id)
                                && ground_distance(entity.transform.position, officer_position)
                                    <= ctx.specs.traffic.redirect_radius
                        })
                        .map(|(id, _)| id)
                        .collect();
                    for vehicle in arrivals {
                        world.hooks.publish(Notification::VehicleRedirected {
                            officer: self.officer,
                            vehicle,
                        });
                        self.redirected.push(vehicle);
                    }

                    if self.remaining.is_zero() {
                        self.state = RedirectState::Done;
                        continue;
                    }
                    break ActionUpdate::Continue;
                }
                RedirectState::Done => break ActionUpdate::Done,
            }
        }
    }
}
