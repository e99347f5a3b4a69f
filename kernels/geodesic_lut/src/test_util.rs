// Deterministic integrator fakes for unit tests. The real physics engine
// lives outside this crate; these cover the contract, not the physics.

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::Vector3;

use crate::geometry;
use crate::integrator::{GeodesicIntegrator, IntegrationError, Trajectory, TrajectoryMeta};

// Flat-space integrator: the ray keeps its initial momentum and marches to
// the termination radius. Counts calls so tests can assert the boundary
// policy skipped a cell.
pub struct StraightLineIntegrator {
    calls: AtomicUsize,
}

impl StraightLineIntegrator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl GeodesicIntegrator for StraightLineIntegrator {
    fn integrate(
        &self,
        direction: Vector3<f64>,
        position: Vector3<f64>,
        max_step: f64,
        r_end: f64,
    ) -> Result<Trajectory, IntegrationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let step = direction.normalize() * max_step;
        let mut positions = vec![position];
        let mut x = position;
        // Hard cap keeps a misconfigured test from spinning forever
        for _ in 0..100_000 {
            if x.norm() > r_end {
                break;
            }
            x += step;
            positions.push(x);
        }
        let momenta = vec![direction; positions.len()];

        Ok(Trajectory {
            momenta,
            positions,
            meta: TrajectoryMeta::default(),
        })
    }
}

// Rotates the end momentum by a fixed angle in the orbital plane, toward
// the body for positive angles, and reports a fixed capture flag. Gives
// grids with known deflection and hit values.
pub struct BendingIntegrator {
    pub deflection: f64,
    pub hit_blackhole: bool,
}

impl GeodesicIntegrator for BendingIntegrator {
    fn integrate(
        &self,
        direction: Vector3<f64>,
        position: Vector3<f64>,
        _max_step: f64,
        _r_end: f64,
    ) -> Result<Trajectory, IntegrationError> {
        let impact = geometry::impact_vector(&position, &direction)
            .map_err(|err| IntegrationError::new(err.to_string()))?;

        let d_hat = direction.normalize();
        let end = d_hat * self.deflection.cos() - impact.p_hat * self.deflection.sin();

        Ok(Trajectory {
            momenta: vec![d_hat, end],
            positions: vec![position, position + d_hat],
            meta: TrajectoryMeta {
                hit_blackhole: self.hit_blackhole,
            },
        })
    }
}

// Always fails; for asserting that integration errors abort a generation
pub struct FailingIntegrator;

impl GeodesicIntegrator for FailingIntegrator {
    fn integrate(
        &self,
        _direction: Vector3<f64>,
        _position: Vector3<f64>,
        _max_step: f64,
        _r_end: f64,
    ) -> Result<Trajectory, IntegrationError> {
        Err(IntegrationError::new("synthetic failure"))
    }
}
