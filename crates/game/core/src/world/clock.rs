use std::time::Duration;

/// Simulation clock handed to every action update.
///
/// Carries the elapsed time since the previous tick and a monotonically
/// increasing tick counter. The counter tags network deltas so receivers can
/// replay them in host order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SimClock {
    pub delta: Duration,
    pub tick: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to the next tick.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.tick += 1;
    }

    /// Elapsed time since the previous tick, in seconds.
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
