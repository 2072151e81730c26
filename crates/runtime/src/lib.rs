//! Tick orchestration for the cordon simulation.
//!
//! This crate wires the gameplay core and the replication layer into a
//! runnable host: [`Simulation`] owns the world, oracles, and per-entity
//! action queues and drives them once per tick; [`TapeHost`] and
//! [`TapeClient`] pump component deltas from the authoritative world to
//! mirrored peers.
pub mod replication;
pub mod simulation;

pub use replication::{RuntimeError, TapeClient, TapeHost, TapeUpdate};
pub use simulation::Simulation;
