// Bilinear interpolation over the sampled (p, l) grid

use ndarray::Array2;
use thiserror::Error;

use crate::grid::DeflectionLut;

// Errors from interpolant construction and queries
#[derive(Debug, Error)]
pub enum InterpError {
    #[error("axis {name} needs at least two samples, got {len}")]
    TooFewSamples { name: &'static str, len: usize },

    #[error("axis {name} is not strictly increasing at index {index}")]
    NonMonotonicAxis { name: &'static str, index: usize },

    #[error("value grid has shape ({rows}, {cols}), axes require ({np}, {nl})")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        np: usize,
        nl: usize,
    },

    #[error(
        "query ({p}, {l}) lies outside the sampled domain \
         p in [{p_min}, {p_max}], l in [{l_min}, {l_max}]"
    )]
    OutOfDomain {
        p: f64,
        l: f64,
        p_min: f64,
        p_max: f64,
        l_min: f64,
        l_max: f64,
    },
}

// ============================================================================
// BILINEAR INTERPOLANT
// ============================================================================

// Bilinear interpolant over one value grid on the rectilinear (p, l) axes.
// The axes may be non-uniformly spaced (adaptive tables concatenate
// sub-ranges), so cell lookup is a binary search rather than an index
// formula. Stateless once built: evaluation never mutates.
#[derive(Debug, Clone)]
pub struct Interp2d {
    p_axis: Vec<f64>,
    l_axis: Vec<f64>,
    values: Array2<f64>,
}

impl Interp2d {
    // Build an interpolant over `values` sampled at the given axes.
    //
    // Requires at least two samples per axis, strictly increasing axes
    // (duplicate sub-range boundaries from the adaptive builder are
    // rejected here), and a matching value shape.
    pub fn new(
        p_axis: Vec<f64>,
        l_axis: Vec<f64>,
        values: Array2<f64>,
    ) -> Result<Self, InterpError> {
        check_axis("p", &p_axis)?;
        check_axis("l", &l_axis)?;

        let (rows, cols) = values.dim();
        if rows != p_axis.len() || cols != l_axis.len() {
            return Err(InterpError::ShapeMismatch {
                rows,
                cols,
                np: p_axis.len(),
                nl: l_axis.len(),
            });
        }

        Ok(Self {
            p_axis,
            l_axis,
            values,
        })
    }

    // Sampled domain on the p-axis
    #[inline]
    pub fn p_domain(&self) -> (f64, f64) {
        (self.p_axis[0], self.p_axis[self.p_axis.len() - 1])
    }

    // Sampled domain on the l-axis
    #[inline]
    pub fn l_domain(&self) -> (f64, f64) {
        (self.l_axis[0], self.l_axis[self.l_axis.len() - 1])
    }

    // Whether a query point lies inside the sampled domain (inclusive)
    pub fn contains(&self, p: f64, l: f64) -> bool {
        let (p_min, p_max) = self.p_domain();
        let (l_min, l_max) = self.l_domain();
        p >= p_min && p <= p_max && l >= l_min && l <= l_max
    }

    // Evaluate at (p, l): the bilinear blend of the four grid corners
    // enclosing the query. Queries outside the sampled rectangle fail;
    // there is no extrapolation.
    pub fn eval(&self, p: f64, l: f64) -> Result<f64, InterpError> {
        if !self.contains(p, l) {
            let (p_min, p_max) = self.p_domain();
            let (l_min, l_max) = self.l_domain();
            return Err(InterpError::OutOfDomain {
                p,
                l,
                p_min,
                p_max,
                l_min,
                l_max,
            });
        }

        let (i, tp) = locate(&self.p_axis, p);
        let (j, tl) = locate(&self.l_axis, l);

        let v00 = self.values[[i, j]];
        let v01 = self.values[[i, j + 1]];
        let v10 = self.values[[i + 1, j]];
        let v11 = self.values[[i + 1, j + 1]];

        Ok((1.0 - tp) * ((1.0 - tl) * v00 + tl * v01) + tp * ((1.0 - tl) * v10 + tl * v11))
    }
}

// Axis must carry at least one full cell and be strictly increasing
fn check_axis(name: &'static str, axis: &[f64]) -> Result<(), InterpError> {
    if axis.len() < 2 {
        return Err(InterpError::TooFewSamples {
            name,
            len: axis.len(),
        });
    }
    for (index, pair) in axis.windows(2).enumerate() {
        if !(pair[0] < pair[1]) {
            return Err(InterpError::NonMonotonicAxis {
                name,
                index: index + 1,
            });
        }
    }
    Ok(())
}

// Enclosing cell index and fractional offset for an in-domain query.
// partition_point finds the first sample beyond x; the cell starts one
// sample earlier, clamped so a query on the last sample reuses the final
// cell with t = 1.
fn locate(axis: &[f64], x: f64) -> (usize, f64) {
    let upper = axis.partition_point(|&v| v <= x);
    let i = upper.saturating_sub(1).min(axis.len() - 2);
    let t = ((x - axis[i]) / (axis[i + 1] - axis[i])).clamp(0.0, 1.0);
    (i, t)
}

// ============================================================================
// INTERPOLANT FACTORY
// ============================================================================

// Build the two independent interpolants (hit flags, deflection angles)
// from a generated or loaded table. Explicit by design: loading a table
// does not implicitly construct interpolation state.
pub fn build_interpolants(lut: &DeflectionLut) -> Result<(Interp2d, Interp2d), InterpError> {
    let hit = Interp2d::new(lut.p_axis.clone(), lut.l_axis.clone(), lut.hit.clone())?;
    let deflection = Interp2d::new(
        lut.p_axis.clone(),
        lut.l_axis.clone(),
        lut.deflection.clone(),
    )?;
    Ok((hit, deflection))
}
