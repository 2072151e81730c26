//! Traits describing the host engine's world-query surface.
//!
//! Terrain and collision queries are consumed through narrow oracle traits so
//! gameplay code never couples to the physics or navigation implementation.
//! The [`Env`] aggregate bundles the oracle references an action or validator
//! needs for one call. Simple in-memory implementations back the test suites
//! and offline tools.

use glam::Vec3;

use crate::world::handle::EntityId;

/// Navigable-area classification at a world point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroundArea {
    Free,
    Street,
    Sidewalk,
    TrainTrack,
    Water,
    Air,
}

impl GroundArea {
    /// Areas a barrier pole may never stand on.
    #[inline]
    pub fn is_illegal_for_pole(self) -> bool {
        !matches!(self, Self::Free)
    }
}

/// One nearest-legal-point sample returned by the navigation map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSample {
    pub point: Vec3,
    pub area: GroundArea,
}

/// Terrain and navigation-map queries.
pub trait TerrainOracle: core::fmt::Debug {
    /// Terrain height directly below the (x, z) column.
    fn ground_height(&self, x: f32, z: f32) -> f32;

    /// Nearest-legal-point samples within `radius` of `point`, in the map's
    /// native iteration order. Callers scanning these must treat that order
    /// as meaningful.
    fn samples_near(&self, point: Vec3, radius: f32) -> Vec<GroundSample>;

    /// True when the point lies inside a water body.
    fn is_in_water(&self, point: Vec3) -> bool;
}

/// Physics collision queries.
pub trait CollisionOracle: core::fmt::Debug {
    /// First entity hit by a ray between the two points, if any.
    fn first_hit(&self, from: Vec3, to: Vec3) -> Option<EntityId>;

    /// True when a sphere of `radius` placed at `center` would overlap
    /// existing world collision.
    fn shape_would_collide(&self, center: Vec3, radius: f32) -> bool;
}

/// Raised when gameplay code needs an oracle the host did not provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("terrain oracle not available")]
    TerrainNotAvailable,
    #[error("collision oracle not available")]
    CollisionNotAvailable,
}

/// Aggregates read-only oracle references for one update call.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    terrain: Option<&'a dyn TerrainOracle>,
    collision: Option<&'a dyn CollisionOracle>,
}

impl<'a> Env<'a> {
    pub fn new(
        terrain: Option<&'a dyn TerrainOracle>,
        collision: Option<&'a dyn CollisionOracle>,
    ) -> Self {
        Self { terrain, collision }
    }

    pub fn with_all(
        terrain: &'a dyn TerrainOracle,
        collision: &'a dyn CollisionOracle,
    ) -> Self {
        Self::new(Some(terrain), Some(collision))
    }

    pub fn empty() -> Self {
        Self {
            terrain: None,
            collision: None,
        }
    }

    /// Returns the terrain oracle, or an error if not available.
    pub fn terrain(&self) -> Result<&'a dyn TerrainOracle, OracleError> {
        self.terrain.ok_or(OracleError::TerrainNotAvailable)
    }

    /// Returns the collision oracle, or an error if not available.
    pub fn collision(&self) -> Result<&'a dyn CollisionOracle, OracleError> {
        self.collision.ok_or(OracleError::CollisionNotAvailable)
    }
}

// ============================================================================
// In-memory oracle implementations
// ============================================================================

/// Flat terrain with explicitly placed classification samples and water discs.
///
/// Columns without an explicit sample nearby classify as `default_area`, so a
/// bare `FlatTerrain` accepts pole placement everywhere.
#[derive(Clone, Debug)]
pub struct FlatTerrain {
    height: f32,
    default_area: GroundArea,
    samples: Vec<GroundSample>,
    water: Vec<(Vec3, f32)>,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            default_area: GroundArea::Free,
            samples: Vec::new(),
            water: Vec::new(),
        }
    }

    pub fn with_default_area(mut self, area: GroundArea) -> Self {
        self.default_area = area;
        self
    }

    /// Registers a classification sample. Samples are returned to queries in
    /// insertion order.
    pub fn with_sample(mut self, point: Vec3, area: GroundArea) -> Self {
        self.samples.push(GroundSample { point, area });
        self
    }

    pub fn with_water(mut self, center: Vec3, radius: f32) -> Self {
        self.water.push((center, radius));
        self
    }
}

impl TerrainOracle for FlatTerrain {
    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn samples_near(&self, point: Vec3, radius: f32) -> Vec<GroundSample> {
        let nearby: Vec<GroundSample> = self
            .samples
            .iter()
            .filter(|sample| sample.point.distance(point) <= radius)
            .copied()
            .collect();
        if nearby.is_empty() {
            vec![GroundSample {
                point: Vec3::new(point.x, self.height, point.z),
                area: self.default_area,
            }]
        } else {
            nearby
        }
    }

    fn is_in_water(&self, point: Vec3) -> bool {
        self.water
            .iter()
            .any(|(center, radius)| center.distance(point) <= *radius)
    }
}

#[derive(Clone, Copy, Debug)]
struct SphereCollider {
    center: Vec3,
    radius: f32,
    entity: EntityId,
}

/// Static sphere colliders backing raycast and overlap queries.
#[derive(Clone, Debug, Default)]
pub struct StaticColliders {
    spheres: Vec<SphereCollider>,
}

impl StaticColliders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sphere(mut self, center: Vec3, radius: f32, entity: EntityId) -> Self {
        self.spheres.push(SphereCollider {
            center,
            radius,
            entity,
        });
        self
    }
}

impl CollisionOracle for StaticColliders {
    fn first_hit(&self, from: Vec3, to: Vec3) -> Option<EntityId> {
        let dir = to - from;
        let len_sq = dir.length_squared();
        if len_sq <= f32::EPSILON {
            return None;
        }

        let mut best: Option<(f32, EntityId)> = None;
        for sphere in &self.spheres {
            // Closest point on the segment to the sphere center.
            let t = ((sphere.center - from).dot(dir) / len_sq).clamp(0.0, 1.0);
            let closest = from + dir * t;
            if closest.distance(sphere.center) <= sphere.radius {
                match best {
                    Some((best_t, _)) if best_t <= t => {}
                    _ => best = Some((t, sphere.entity)),
                }
            }
        }
        best.map(|(_, entity)| entity)
    }

    fn shape_would_collide(&self, center: Vec3, radius: f32) -> bool {
        self.spheres
            .iter()
            .any(|sphere| sphere.center.distance(center) <= sphere.radius + radius)
    }
}
