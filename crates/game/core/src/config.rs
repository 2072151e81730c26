//! Designer-tunable spec groups.
//!
//! Every numeric threshold gameplay code compares against lives here, grouped
//! by feature and aggregated in [`Specs`]. The aggregate is passed by
//! reference into the systems that need it; actions re-read values every tick
//! so edits take effect mid-game.

use std::time::Duration;

/// Weapon carried by a shooting action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponType {
    Pistol,
    Rifle,
}

/// Value-type weapon tuning, copied into each shooting action at init time.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponConfiguration {
    pub weapon: WeaponType,
    /// Health fraction removed per shot against persons.
    pub health_damage: f32,
    /// Health fraction removed per shot against vehicles.
    pub vehicle_damage: f32,
    pub shoot_range: f32,
    /// Maximum shots against one target; 0 means unlimited.
    pub max_shots: u32,
    pub aim_time: Duration,
    /// Pause after each shot before the next aim cycle.
    pub wait_after_shot: Duration,
}

impl WeaponConfiguration {
    pub fn pistol() -> Self {
        Self {
            weapon: WeaponType::Pistol,
            health_damage: 0.34,
            vehicle_damage: 0.1,
            shoot_range: 15.0,
            max_shots: 0,
            aim_time: Duration::from_millis(800),
            wait_after_shot: Duration::from_millis(600),
        }
    }

    pub fn rifle() -> Self {
        Self {
            weapon: WeaponType::Rifle,
            health_damage: 0.5,
            vehicle_damage: 0.25,
            shoot_range: 40.0,
            max_shots: 0,
            aim_time: Duration::from_millis(1200),
            wait_after_shot: Duration::from_millis(900),
        }
    }

    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.max_shots = max_shots;
        self
    }
}

/// Barrier-tape placement tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarrierTapeSpecs {
    /// Minimum tape span between the two poles.
    pub min_length: f32,
    /// Maximum tape span between the two poles.
    pub max_length: f32,
    pub pole_radius: f32,
    /// Approximate pole-top height used for the tape line raycast.
    pub pole_top_height: f32,
    /// Ground-area samples farther than this from the query point are ignored.
    pub sample_epsilon: f32,
    /// Time spent planting one pole.
    pub place_time: Duration,
}

impl Default for BarrierTapeSpecs {
    fn default() -> Self {
        Self {
            min_length: 2.0,
            max_length: 10.0,
            pole_radius: 0.15,
            pole_top_height: 1.0,
            sample_epsilon: 0.5,
            place_time: Duration::from_millis(500),
        }
    }
}

/// Hunt-and-shoot pursuit tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PursuitSpecs {
    /// Pursuit is abandoned once the target is farther away than this.
    pub give_up_distance: f32,
    /// Fraction of weapon range the pursuer closes to before shooting.
    pub approach_factor: f32,
}

impl Default for PursuitSpecs {
    fn default() -> Self {
        Self {
            give_up_distance: 80.0,
            approach_factor: 0.9,
        }
    }
}

/// Unit movement tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementSpecs {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub arrive_tolerance: f32,
}

impl Default for MovementSpecs {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            arrive_tolerance: 0.25,
        }
    }
}

/// Traffic redirection tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficSpecs {
    /// How long an officer keeps waving traffic through.
    pub redirect_duration: Duration,
    /// Vehicles inside this radius get redirected.
    pub redirect_radius: f32,
}

impl Default for TrafficSpecs {
    fn default() -> Self {
        Self {
            redirect_duration: Duration::from_secs(20),
            redirect_radius: 12.0,
        }
    }
}

/// DLK ladder rig tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LadderSpecs {
    pub extend_legs_time: Duration,
    /// Ladder alignment speed, radians per second.
    pub align_speed: f32,
    pub fold_time: Duration,
}

impl Default for LadderSpecs {
    fn default() -> Self {
        Self {
            extend_legs_time: Duration::from_secs(3),
            align_speed: 0.6,
            fold_time: Duration::from_secs(2),
        }
    }
}

/// Aggregate of every tunable group, constructed at simulation start and
/// passed by reference into the systems that need it.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Specs {
    pub barrier: BarrierTapeSpecs,
    pub pursuit: PursuitSpecs,
    pub movement: MovementSpecs,
    pub traffic: TrafficSpecs,
    pub ladder: LadderSpecs,
}

impl Specs {
    pub fn new() -> Self {
        Self::default()
    }
}
