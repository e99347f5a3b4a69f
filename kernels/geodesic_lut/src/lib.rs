// kernels/geodesic_lut/src/lib.rs

// Geodesic Deflection Lookup Tables
//
// Integrating a null geodesic past a black hole is far too slow to do per
// ray at render time. This library precomputes the answer instead: it
// sweeps an external geodesic integrator over a 2-D grid of ray parameters
// (impact parameter p, angular parameter l), records the signed deflection
// angle and an event-horizon capture flag per cell, persists the resulting
// table, and serves bilinear lookups over it at query time.
//
// The physics engine itself stays outside this crate, behind the
// GeodesicIntegrator trait. All computations use f64; the deflection
// changes sharply near the critical radius and the adaptive grid mode
// exists precisely to resolve that region.

pub mod geometry;
pub mod grid;
pub mod integrator;
pub mod interpolate;
pub mod sample;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use geometry::{angle, impact_vector, GeometryError, ImpactDecomposition};
pub use grid::{build_l_axis, build_p_axis, generate, DeflectionLut, GenerateError};
pub use integrator::{GeodesicIntegrator, IntegrationError, Trajectory, TrajectoryMeta};
pub use interpolate::{build_interpolants, Interp2d, InterpError};
pub use sample::{curve_props, CurveProps, SampleError};
pub use store::{filename, load, save, StoreError};
pub use types::{ConfigError, CoordinateSystem, SamplerConfig, HIT, INSIDE_BODY, MISS};
