use std::collections::VecDeque;

use crate::action::{Action, ActionPriority, ActionStep, ActionUpdate, RunContext};
use crate::world::World;

struct Entry {
    action: Action,
    priority: ActionPriority,
    started: bool,
}

/// Ordered, priority-aware action plan for one entity.
///
/// Exactly one action runs at a time: the front of the queue. Pushes insert
/// before the first entry of strictly lower priority while preserving
/// insertion order among equals; [`ActionQueue::push_front`] bypasses that
/// for parent-pushed children.
///
/// Lifecycle guarantees: `startup` runs once before the first poll and a
/// rejection discards the action silently; every action whose `startup`
/// returned true receives exactly one `shutdown`, whether it finished,
/// aborted the plan, or was cleared externally.
#[derive(Default)]
pub struct ActionQueue {
    entries: VecDeque<Entry>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Priority of the currently scheduled front action.
    pub fn current_priority(&self) -> Option<ActionPriority> {
        self.entries.front().map(|entry| entry.priority)
    }

    /// Name of the currently scheduled front action.
    pub fn current_action(&self) -> Option<&'static str> {
        self.entries.front().map(|entry| entry.action.name())
    }

    /// Enqueues an action behind every entry of equal or higher priority.
    pub fn push(&mut self, action: impl Into<Action>, priority: ActionPriority) {
        let action = action.into();
        let index = self
            .entries
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            index,
            Entry {
                action,
                priority,
                started: false,
            },
        );
    }

    /// Inserts an action at the very front; it runs to completion before the
    /// current front action is polled again.
    pub fn push_front(&mut self, action: impl Into<Action>, priority: ActionPriority) {
        self.entries.push_front(Entry {
            action: action.into(),
            priority,
            started: false,
        });
    }

    /// Discards the whole plan. Every started action still receives its one
    /// `shutdown` call; pending actions that never started do not.
    pub fn clear(&mut self, world: &mut World, ctx: &RunContext<'_>) {
        let entries: Vec<Entry> = self.entries.drain(..).collect();
        for mut entry in entries {
            if entry.started {
                entry.action.shutdown(world, ctx);
            }
        }
    }

    /// Clears the plan on behalf of an incoming command when its priority is
    /// at least the current front priority. Returns false when the running
    /// plan outranks the request, in which case nothing changes.
    pub fn preempt(
        &mut self,
        priority: ActionPriority,
        world: &mut World,
        ctx: &RunContext<'_>,
    ) -> bool {
        match self.current_priority() {
            Some(current) if current > priority => false,
            _ => {
                self.clear(world, ctx);
                true
            }
        }
    }

    /// Polls the front action once. Called once per simulation tick.
    pub fn update(&mut self, world: &mut World, ctx: &RunContext<'_>) {
        // Start pending actions until one sticks; startup rejections are
        // discarded without a shutdown call.
        loop {
            let Some(front) = self.entries.front_mut() else {
                return;
            };
            if front.started {
                break;
            }
            if front.action.startup(world, ctx) {
                front.started = true;
                break;
            }
            self.entries.pop_front();
        }

        let Some(mut entry) = self.entries.pop_front() else {
            return;
        };
        match entry.action.update(world, ctx) {
            ActionUpdate::Continue => self.entries.push_front(entry),
            ActionUpdate::Push(child) => {
                let priority = entry.priority;
                self.entries.push_front(entry);
                self.entries.push_front(Entry {
                    action: *child,
                    priority,
                    started: false,
                });
            }
            ActionUpdate::Done => entry.action.shutdown(world, ctx),
            ActionUpdate::ClearList => {
                entry.action.shutdown(world, ctx);
                self.clear(world, ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use glam::Vec3;

    use crate::action::scripted::ScriptedAction;
    use crate::action::{
        LadderUndeployAction, PlaceBarrierPoleAction, RedirectTrafficAction, ShootAction,
    };
    use crate::config::{Specs, WeaponConfiguration};
    use crate::placement::PoleIndex;
    use crate::world::{Env, EntityKind, FlatTerrain, SimClock, Transform};

    fn ctx(specs: &Specs) -> RunContext<'_> {
        let mut clock = SimClock::new();
        clock.advance(Duration::from_millis(100));
        RunContext {
            env: Env::empty(),
            specs,
            clock,
        }
    }

    fn counters() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
        (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)))
    }

    #[test]
    fn startup_rejection_falls_through_to_next_action() {
        let mut world = World::new();
        // The truck's ladder is stowed, so undeploy must refuse to start.
        let truck = world
            .scene
            .spawn(EntityKind::Vehicle, Transform::at(Vec3::ZERO));

        let specs = Specs::default();
        let ctx = ctx(&specs);
        let mut queue = ActionQueue::new();
        queue.push(LadderUndeployAction::new(truck), ActionPriority::NORMAL);
        queue.push(RedirectTrafficAction::new(truck), ActionPriority::NORMAL);

        queue.update(&mut world, &ctx);
        assert_eq!(queue.current_action(), Some("redirect_traffic"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn clear_shuts_down_started_actions() {
        let mut world = World::new();
        let squad = world
            .scene
            .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        world.attach_tape(squad);

        let terrain = FlatTerrain::new(0.0);
        let specs = Specs::default();
        let mut clock = SimClock::new();
        clock.advance(Duration::from_millis(100));
        let ctx = RunContext {
            env: Env::new(Some(&terrain), None),
            specs: &specs,
            clock,
        };

        let mut queue = ActionQueue::new();
        queue.push(
            PlaceBarrierPoleAction::new(squad, PoleIndex::First, Vec3::new(2.0, 0.0, 0.0)),
            ActionPriority::NORMAL,
        );
        // Two ticks: preview pole exists but the plant timer has not elapsed.
        queue.update(&mut world, &ctx);
        queue.update(&mut world, &ctx);
        assert_eq!(world.scene.len(), 2);

        queue.clear(&mut world, &ctx);
        assert!(queue.is_empty());
        // Shutdown removed the uncommitted preview pole.
        assert_eq!(world.scene.len(), 1);
        assert_eq!(world.tape(squad).map(|tape| tape.num_poles()), Some(0));
    }

    #[test]
    fn completed_action_shuts_down_exactly_once() {
        let mut world = World::new();
        let specs = Specs::default();
        let ctx = ctx(&specs);
        let (startups, shutdowns) = counters();

        let mut queue = ActionQueue::new();
        queue.push(
            ScriptedAction::new(&startups, &shutdowns).ticks(2),
            ActionPriority::NORMAL,
        );
        while !queue.is_empty() {
            queue.update(&mut world, &ctx);
        }
        // Polling an empty queue must not revisit the finished action.
        queue.update(&mut world, &ctx);

        assert_eq!(startups.get(), 1);
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn clear_list_shuts_down_once_and_spares_pending_actions() {
        let mut world = World::new();
        let specs = Specs::default();
        let ctx = ctx(&specs);
        let (aborter_startups, aborter_shutdowns) = counters();
        let (pending_startups, pending_shutdowns) = counters();

        let mut queue = ActionQueue::new();
        queue.push(
            ScriptedAction::new(&aborter_startups, &aborter_shutdowns).clearing(),
            ActionPriority::NORMAL,
        );
        queue.push(
            ScriptedAction::new(&pending_startups, &pending_shutdowns),
            ActionPriority::NORMAL,
        );
        queue.update(&mut world, &ctx);

        assert!(queue.is_empty());
        assert_eq!(aborter_startups.get(), 1);
        assert_eq!(aborter_shutdowns.get(), 1);
        // The queued follower never started, so it is discarded silently.
        assert_eq!(pending_startups.get(), 0);
        assert_eq!(pending_shutdowns.get(), 0);
    }

    #[test]
    fn external_clear_and_startup_rejection_balance_the_lifecycle() {
        let mut world = World::new();
        let specs = Specs::default();
        let ctx = ctx(&specs);
        let (rejected_startups, rejected_shutdowns) = counters();
        let (running_startups, running_shutdowns) = counters();

        let mut queue = ActionQueue::new();
        queue.push(
            ScriptedAction::new(&rejected_startups, &rejected_shutdowns).rejecting(),
            ActionPriority::NORMAL,
        );
        queue.push(
            ScriptedAction::new(&running_startups, &running_shutdowns).ticks(10),
            ActionPriority::NORMAL,
        );
        queue.update(&mut world, &ctx);
        assert_eq!(rejected_startups.get(), 1);
        assert_eq!(rejected_shutdowns.get(), 0);

        queue.clear(&mut world, &ctx);
        queue.clear(&mut world, &ctx);
        assert_eq!(running_startups.get(), 1);
        assert_eq!(running_shutdowns.get(), 1);
        assert_eq!(rejected_shutdowns.get(), 0);
    }

    #[test]
    fn push_orders_by_priority_then_insertion() {
        let mut world = World::new();
        let officer = world
            .scene
            .spawn(EntityKind::Person, Transform::at(Vec3::ZERO));
        let target = world
            .scene
            .spawn(EntityKind::Person, Transform::at(Vec3::ONE));
        let target_ref = world.scene.weak_ref(target).unwrap();

        let mut queue = ActionQueue::new();
        queue.push(
            ShootAction::new(officer, target_ref, WeaponConfiguration::pistol()),
            ActionPriority::NORMAL,
        );
        queue.push(RedirectTrafficAction::new(officer), ActionPriority::BLOCKING);
        assert_eq!(queue.current_action(), Some("redirect_traffic"));
        assert_eq!(queue.current_priority(), Some(ActionPriority::BLOCKING));
    }
}
