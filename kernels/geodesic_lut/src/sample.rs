// Deflection extraction for a single integrated trajectory

use nalgebra::Vector3;
use thiserror::Error;

use crate::geometry::{self, GeometryError, ImpactDecomposition};

// Errors raised while reducing a trajectory to its deflection properties
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("trajectory has no samples")]
    EmptyTrajectory,

    #[error("trajectory sample counts disagree: {momenta} momenta vs {positions} positions")]
    LengthMismatch { momenta: usize, positions: usize },

    #[error("last_index {index} is out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

// Deflection properties of one integrated ray
#[derive(Debug, Clone, Copy)]
pub struct CurveProps {
    // Signed deflection angle in (-pi, pi]; positive means the ray rotated
    // away from the impact direction p_hat
    pub deflection: f64,

    // Impact decomposition of the ray's starting conditions, kept for
    // downstream diagnostics
    pub impact: ImpactDecomposition,
}

// Compute the signed deflection angle and impact basis of one trajectory.
//
// The ray origin is the first position sample and the initial direction the
// first momentum sample; `last_index` picks the sample that stands in for
// "end of integration" (default: the final one, e.g. pass an earlier index
// to measure the deflection accumulated partway along the ray).
//
// Sign rule: acos always reports the smaller angle between two vectors, so
// a rotation of more than pi is indistinguishable from its reflection. If
// the end direction still points toward the impact side (dot product with
// p_hat >= 0) the rotation has passed pi and the angle is negated, which
// keeps clockwise and counter-clockwise deflections distinct across the
// whole table.
pub fn curve_props(
    momenta: &[Vector3<f64>],
    positions: &[Vector3<f64>],
    last_index: Option<usize>,
) -> Result<CurveProps, SampleError> {
    if momenta.is_empty() || positions.is_empty() {
        return Err(SampleError::EmptyTrajectory);
    }
    if momenta.len() != positions.len() {
        return Err(SampleError::LengthMismatch {
            momenta: momenta.len(),
            positions: positions.len(),
        });
    }

    let last = last_index.unwrap_or(momenta.len() - 1);
    if last >= momenta.len() {
        return Err(SampleError::IndexOutOfRange {
            index: last,
            len: momenta.len(),
        });
    }

    let ray_origin = positions[0];
    let ray_direction = momenta[0];
    let ray_dir_end = momenta[last];

    let mut deflection = geometry::angle(&ray_direction, &ray_dir_end)?;
    let impact = geometry::impact_vector(&ray_origin, &ray_direction)?;

    if ray_dir_end.dot(&impact.p_hat) >= 0.0 {
        deflection = -deflection;
    }

    Ok(CurveProps { deflection, impact })
}
