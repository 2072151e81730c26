//! One-shot gameplay notifications and veto hooks.
//!
//! Replaces the host message bus with explicit callback lists: observers
//! receive every published notification, veto hooks answer "may I reject
//! this?" questions with `Option<bool>` aggregated so that any `Some(true)`
//! wins.

use crate::world::EntityId;

/// One-shot gameplay notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A shot was fired. Emitted exactly once per completed shot.
    GunShot {
        shooter: EntityId,
        target: EntityId,
    },
    /// Muzzle flash side effect, emitted at the shot transition.
    MuzzleFlash { shooter: EntityId },
    /// A pursued target got away; surfaces as a player hint.
    TargetEscaped {
        pursuer: EntityId,
        target: EntityId,
    },
    /// Both poles stand and the tape is up.
    BarrierFinished { owner: EntityId },
    /// An officer waved a vehicle off its lane.
    VehicleRedirected {
        officer: EntityId,
        vehicle: EntityId,
    },
}

type Observer = Box<dyn FnMut(&Notification)>;
type Veto = Box<dyn Fn(&Notification) -> Option<bool>>;

/// Callback registry owned by the world.
#[derive(Default)]
pub struct Hooks {
    observers: Vec<Observer>,
    vetoes: Vec<Veto>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer invoked for every published notification.
    pub fn observe(&mut self, observer: impl FnMut(&Notification) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Registers a veto hook. Returning `Some(true)` rejects the queried
    /// notification; `None` abstains.
    pub fn add_veto(&mut self, veto: impl Fn(&Notification) -> Option<bool> + 'static) {
        self.vetoes.push(Box::new(veto));
    }

    /// Publishes a notification to every observer.
    pub fn publish(&mut self, notification: Notification) {
        for observer in &mut self.observers {
            observer(&notification);
        }
    }

    /// Asks every veto hook whether the notification should be rejected.
    /// Any `Some(true)` wins; abstentions do not count.
    pub fn is_vetoed(&self, notification: &Notification) -> bool {
        self.vetoes
            .iter()
            .any(|veto| veto(notification) == Some(true))
    }
}
