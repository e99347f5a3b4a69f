// Call contract for the external geodesic integrator

use nalgebra::Vector3;
use thiserror::Error;

// ============================================================================
// TRAJECTORY DATA
// ============================================================================

// Metadata reported alongside one integrated trajectory.
//
// The integrator may track more than this internally; the table generator
// only consumes the capture flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryMeta {
    // Ray crossed the event horizon before reaching the termination radius
    pub hit_blackhole: bool,
}

// Ordered samples along one integrated ray: the spatial momentum and
// position at each accepted step, first sample = initial conditions.
// Owned transiently by the caller and discarded once the deflection has
// been extracted.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub momenta: Vec<Vector3<f64>>,
    pub positions: Vec<Vector3<f64>>,
    pub meta: TrajectoryMeta,
}

impl Trajectory {
    // Number of samples along the ray
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// ============================================================================
// INTEGRATOR CONTRACT
// ============================================================================

// Failure reported by an integrator implementation (numerical divergence,
// invalid coordinates, ...). Opaque to the table generator, which treats
// any integration failure as fatal for the whole run.
#[derive(Debug, Error)]
#[error("geodesic integration failed: {reason}")]
pub struct IntegrationError {
    reason: String,
}

impl IntegrationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// The narrow contract the table generator consumes the physics engine
// through. Implementations own their central-mass and coordinate-chart
// state (the generator's `m` and `coordinates` parameters describe the
// integrator it is paired with; they are recorded in the output filename
// and drive the inside-body boundary policy, not the integration itself).
//
// Sync is required so the grid sweep can share one integrator across
// worker threads; implementations are expected to be stateless per call.
pub trait GeodesicIntegrator: Sync {
    // Integrate one ray from `position` with initial spatial momentum
    // `direction` until it escapes past `r_end`, is captured, or the
    // implementation gives up. `max_step` bounds the step size.
    fn integrate(
        &self,
        direction: Vector3<f64>,
        position: Vector3<f64>,
        max_step: f64,
        r_end: f64,
    ) -> Result<Trajectory, IntegrationError>;
}
