//! Gameplay components attached to scene entities.
mod barrier_tape;

pub use barrier_tape::{BarrierError, BarrierTapeComponent, Pole, Tape, TapeConnection};
