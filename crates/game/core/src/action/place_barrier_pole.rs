use std::time::Duration;

use glam::Vec3;

use crate::action::{ActionStep, ActionUpdate, RunContext};
use crate::component::TapeConnection;
use crate::events::Notification;
use crate::placement::{self, MarkerColor, PoleIndex};
use crate::world::{EntityId, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlaceState {
    Init,
    Position,
    Plant,
    Connect,
    Done,
}

/// Plants one barrier pole at a proposed position.
///
/// The pole is created as a preview, validated in place, and only committed
/// after the planting time has elapsed. The ground marker color is a pure
/// function of the validator, recomputed on every positioning tick rather
/// than cached. Planting the second pole also stretches the tape and raises
/// the barrier.
pub struct PlaceBarrierPoleAction {
    placer: EntityId,
    index: PoleIndex,
    target: Vec3,
    state: PlaceState,
    timer: Duration,
    committed: bool,
    marker: MarkerColor,
}

impl PlaceBarrierPoleAction {
    pub fn new(placer: EntityId, index: PoleIndex, target: Vec3) -> Self {
        Self {
            placer,
            index,
            target,
            state: PlaceState::Init,
            timer: Duration::ZERO,
            committed: false,
            marker: MarkerColor::Red,
        }
    }

    /// Marker color computed for the last proposed position.
    pub fn marker(&self) -> MarkerColor {
        self.marker
    }
}

impl ActionStep for PlaceBarrierPoleAction {
    fn name(&self) -> &'static str {
        "place_barrier_pole"
    }

    fn startup(&mut self, world: &mut World, _ctx: &RunContext<'_>) -> bool {
        world.scene.get(self.placer).is_some() && world.tape(self.placer).is_some()
    }

    fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) -> ActionUpdate {
        let world = &mut *world;
        if world.tapes.get(&self.placer).is_none() {
            self.state = PlaceState::Done;
        }

        loop {
            match self.state {
                PlaceState::Init => {
                    let Ok(terrain) = ctx.env.terrain() else {
                        self.state = PlaceState::Done;
                        continue;
                    };
                    let Some(tape) = world.tapes.get_mut(&self.placer) else {
                        self.state = PlaceState::Done;
                        continue;
                    };
                    if tape.create_pole(&mut world.scene, self.index).is_err() {
                        self.state = PlaceState::Done;
                        continue;
                    }
                    if tape
                        .move_pole(&mut world.scene, terrain, self.index, self.target)
                        .is_err()
                    {
                        self.state = PlaceState::Done;
                        continue;
                    }
                    self.state = PlaceState::Position;
                    break ActionUpdate::Continue;
                }
                PlaceState::Position => {
                    let Some(tape) = world.tapes.get(&self.placer) else {
                        self.state = PlaceState::Done;
                        continue;
                    };
                    // Validate the pole where it actually stands, after the
                    // Y snap, not the caller-supplied point.
                    let Some(candidate) = tape.pole_position(&world.scene, self.index) else {
                        self.state = PlaceState::Done;
                        continue;
                    };
                    let valid = placement::is_valid_pole_position(
                        self.index,
                        candidate,
                        tape,
                        &world.scene,
                        &ctx.env,
                        &ctx.specs.barrier,
                    );
                    self.marker = MarkerColor::from_validity(valid);
                    if !valid {
                        // Refuse to commit; the preview pole is removed on
                        // shutdown and the command layer may retry elsewhere.
                        self.state = PlaceState::Done;
                        continue;
                    }
                    self.timer = ctx.specs.barrier.place_time;
                    self.state = PlaceState::Plant;
                    break ActionUpdate::Continue;
                }
                PlaceState::Plant => {
                    self.timer = self.timer.saturating_sub(ctx.clock.delta);
                    if !self.timer.is_zero() {
                        break ActionUpdate::Continue;
                    }
                    self.committed = true;
                    if self.index == PoleIndex::Second {
                        self.state = PlaceState::Connect;
                        continue;
                    }
                    self.state = PlaceState::Done;
                    continue;
                }
                PlaceState::Connect => {
                    let Some(tape) = world.tapes.get_mut(&self.placer) else {
                        self.state = PlaceState::Done;
                        continue;
                    };
                    if tape
                        .create_tape(&mut world.scene, TapeConnection::PoleToPole, None)
                        .is_ok()
                    {
                        tape.set_finished_building(true);
                        tape.set_barrier(&mut world.scene, true);
                        world.hooks.publish(Notification::BarrierFinished {
                            owner: self.placer,
                        });
                    }
                    self.state = PlaceState::Done;
                    continue;
                }
                PlaceState::Done => break ActionUpdate::Done,
            }
        }
    }

    fn shutdown(&mut self, world: &mut World, _ctx: &RunContext<'_>) {
        // Uncommitted previews must not leak a pole into the scene.
        if !self.committed {
            let world = &mut *world;
            if let Some(tape) = world.tapes.get_mut(&self.placer) {
                tape.destroy_pole(&mut world.scene, self.index);
            }
        }
    }
}
