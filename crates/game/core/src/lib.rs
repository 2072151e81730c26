//! Deterministic emergency-scene game logic shared across clients.
//!
//! `cordon-core` defines the canonical rules: the entity scene, tick-polled
//! actions and their queues, command validation, the barrier-tape component
//! with its geometric placement checks, and the notification hooks gameplay
//! raises along the way. Everything here is pure simulation; rendering,
//! transport, and replication live in the sibling crates.
pub mod action;
pub mod command;
pub mod component;
pub mod config;
pub mod events;
pub mod placement;
pub mod world;

pub use action::{
    Action, ActionPriority, ActionQueue, ActionStep, ActionUpdate, HuntAndShootAction,
    LadderDeployAction, LadderUndeployAction, MoveGoal, MoveToAction, PlaceBarrierPoleAction,
    RedirectTrafficAction, RunContext, ShootAction,
};
pub use command::{
    Command, DeployLadderCommand, HuntAndShootCommand, PlaceBarrierCommand,
    RedirectTrafficCommand, ShootCommand, UndeployLadderCommand, dispatch,
};
pub use component::{BarrierError, BarrierTapeComponent, Pole, Tape, TapeConnection};
pub use config::{
    BarrierTapeSpecs, LadderSpecs, MovementSpecs, PursuitSpecs, Specs, TrafficSpecs,
    WeaponConfiguration, WeaponType,
};
pub use events::{Hooks, Notification};
pub use placement::{MarkerColor, PoleIndex, is_valid_pole_position, snap_to_ground};
pub use world::{
    CollisionOracle, Entity, EntityId, EntityKind, EntityRef, Env, FlatTerrain, GroundArea,
    GroundSample, Health, OracleError, Scene, SimClock, StaticColliders, TerrainOracle, Transform,
    World, ground_distance,
};
