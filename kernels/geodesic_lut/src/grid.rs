// Parameter-grid sweep: axis construction and table generation

use nalgebra::Vector3;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::integrator::{GeodesicIntegrator, IntegrationError};
use crate::sample::{curve_props, SampleError};
use crate::store::{self, StoreError};
use crate::types::{ConfigError, SamplerConfig, HIT, INSIDE_BODY, MISS};

// Gap inserted between adaptive sub-ranges so their boundary samples do not
// coincide
pub(crate) const ADAPTIVE_EPS: f64 = 0.01;

// ============================================================================
// GENERATION ERRORS
// ============================================================================

// Fatal errors during table generation. An integrator or extraction failure
// aborts the whole run; there is no per-cell retry and no partial table.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("integration failed at cell ({ip}, {il}): {source}")]
    Integration {
        ip: usize,
        il: usize,
        #[source]
        source: IntegrationError,
    },

    #[error("deflection extraction failed at cell ({ip}, {il}): {source}")]
    Sample {
        ip: usize,
        il: usize,
        #[source]
        source: SampleError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SAMPLE GRID
// ============================================================================

// One generated lookup table: hit flags and signed deflection angles over
// the sampled (p, l) axes. Both grids have shape
// (p_axis.len(), l_axis.len()). This 4-tuple is exactly what gets
// persisted and later turned into interpolants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeflectionLut {
    // HIT / MISS / INSIDE_BODY per cell
    pub hit: Array2<f64>,

    // Signed deflection angle per cell; 0.0 for skipped cells
    pub deflection: Array2<f64>,

    // Impact-parameter sample coordinates (may be non-uniform)
    pub p_axis: Vec<f64>,

    // Angular-parameter sample coordinates (always uniform)
    pub l_axis: Vec<f64>,
}

// ============================================================================
// AXIS CONSTRUCTION
// ============================================================================

// n samples from start to end inclusive of both endpoints; n = 1 yields
// just the start, n = 0 an empty axis
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

// The p-axis: uniform over the configured range, or in adaptive mode three
// concatenated sub-ranges that concentrate samples between R_sch and
// 5 R_sch, where the deflection angle changes most sharply:
//
//   (a) num/10 samples  p_start       .. R_sch        (deep capture zone)
//   (b) num    samples  R_sch + eps   .. 5 R_sch      (critical region)
//   (c) num    samples  5 R_sch + eps .. p_end        (far field)
//
// The concatenation is an ordered sequence; coinciding boundary samples are
// tolerated here and rejected only where strict monotonicity is actually
// required (interpolant construction).
pub fn build_p_axis(config: &SamplerConfig) -> Vec<f64> {
    let [p_start, p_end] = config.p_range;

    if !config.adapt_grid {
        return linspace(p_start, p_end, config.num);
    }

    let r_sch = config.schwarzschild_radius();
    let p_split = 5.0 * r_sch;

    let capture = linspace(p_start, r_sch, config.num / 10);
    let critical = linspace(r_sch + ADAPTIVE_EPS, p_split, config.num);
    let far = linspace(p_split + ADAPTIVE_EPS, p_end, config.num);

    let mut axis = Vec::with_capacity(capture.len() + critical.len() + far.len());
    axis.extend(capture);
    axis.extend(critical);
    axis.extend(far);
    axis
}

// The l-axis is always uniform
pub fn build_l_axis(config: &SamplerConfig) -> Vec<f64> {
    let [l_start, l_end] = config.l_range;
    linspace(l_start, l_end, config.num)
}

// ============================================================================
// TABLE GENERATION
// ============================================================================

// Generate one deflection table by sweeping the integrator over the
// (p, l) grid.
//
// Every cell constructs the ray
//
//   origin = (-l, p, 0),  direction = (-1, 0, 0)
//
// i.e. the p sample offsets the ray in y and the l sample in x, with the
// ray travelling in -x past the body at the coordinate origin. Existing
// tables depend on this exact layout, so it is preserved as-is even though
// the axis names suggest the transposed roles.
//
// Cells whose origin lies within 2m + 0.1 of the body are never integrated:
// they are recorded as INSIDE_BODY with zero deflection, a defined boundary
// policy rather than an error.
//
// Each worker owns whole rows of the output, so the outer loop runs in
// parallel with disjoint writes and the result is identical to the
// sequential sweep.
pub fn generate<I>(config: &SamplerConfig, integrator: &I) -> Result<DeflectionLut, GenerateError>
where
    I: GeodesicIntegrator + ?Sized,
{
    config.validate()?;

    let p_axis = build_p_axis(config);
    let l_axis = build_l_axis(config);

    info!(
        num = config.num,
        coordinates = config.coordinates.tag(),
        m = config.m,
        max_step = config.max_step,
        r_end = config.r_end,
        adapt_grid = config.adapt_grid,
        rows = p_axis.len(),
        cols = l_axis.len(),
        "generating deflection table"
    );

    let r_min = 2.0 * config.m + 0.1;

    let rows: Vec<Vec<(f64, f64)>> = p_axis
        .par_iter()
        .enumerate()
        .map(|(ip, &p)| {
            l_axis
                .iter()
                .enumerate()
                .map(|(il, &l)| sample_cell(config, integrator, ip, il, p, l, r_min))
                .collect::<Result<Vec<_>, GenerateError>>()
        })
        .collect::<Result<_, _>>()?;

    let mut hit = Array2::zeros((p_axis.len(), l_axis.len()));
    let mut deflection = Array2::zeros((p_axis.len(), l_axis.len()));
    for (ip, row) in rows.iter().enumerate() {
        for (il, &(hit_flag, angle)) in row.iter().enumerate() {
            hit[[ip, il]] = hit_flag;
            deflection[[ip, il]] = angle;
        }
    }

    let lut = DeflectionLut {
        hit,
        deflection,
        p_axis,
        l_axis,
    };

    if config.save {
        let path = config.save_directory.join(store::filename(config));
        store::save(&lut, &path)?;
        info!(path = %path.display(), "wrote deflection table");
    }

    Ok(lut)
}

// One grid cell: boundary policy, integrator call, deflection extraction.
// Returns (hit flag, signed deflection).
fn sample_cell<I>(
    config: &SamplerConfig,
    integrator: &I,
    ip: usize,
    il: usize,
    p: f64,
    l: f64,
    r_min: f64,
) -> Result<(f64, f64), GenerateError>
where
    I: GeodesicIntegrator + ?Sized,
{
    let origin = Vector3::new(-l, p, 0.0);
    let direction = Vector3::new(-1.0, 0.0, 0.0);
    let r0 = origin.norm();

    if r0 <= r_min {
        if config.verbose {
            debug!(ip, il, p, l, r0, "start inside body, cell skipped");
        }
        return Ok((INSIDE_BODY, 0.0));
    }

    if config.verbose {
        debug!(ip, il, p, l, "integrating cell");
    }

    let trajectory = integrator
        .integrate(direction, origin, config.max_step, config.r_end)
        .map_err(|source| GenerateError::Integration { ip, il, source })?;

    let props = curve_props(&trajectory.momenta, &trajectory.positions, None)
        .map_err(|source| GenerateError::Sample { ip, il, source })?;

    let hit_flag = if trajectory.meta.hit_blackhole {
        HIT
    } else {
        MISS
    };

    Ok((hit_flag, props.deflection))
}
