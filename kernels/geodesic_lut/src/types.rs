// Configuration surface for deflection-table generation

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// HIT-FLAG CELL VALUES
// ============================================================================

// The hit grid stores one of three states per cell, kept as floats so the
// grid can be fed to the same interpolation machinery as the angle grid.

// Ray crossed the event horizon during integration
pub const HIT: f64 = 1.0;

// Ray was integrated and escaped without hitting the body
pub const MISS: f64 = 0.0;

// Ray would have started inside (or grazing) the body; never integrated
pub const INSIDE_BODY: f64 = -1.0;

// ============================================================================
// COORDINATE SYSTEM TAG
// ============================================================================

// Coordinate system the external integrator works in. The tag is forwarded
// to the integrator's owner and encoded into the output filename so tables
// generated against different coordinate charts never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoordinateSystem {
    // Spherical (Schwarzschild-type) coordinates
    #[default]
    Spherical,

    // Horizon-penetrating Kerr-Schild coordinates
    KerrSchild,
}

impl CoordinateSystem {
    // Short tag used in filenames
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Spherical => "SPH",
            Self::KerrSchild => "KS",
        }
    }
}

// ============================================================================
// SAMPLER CONFIGURATION
// ============================================================================

// Full parameter surface of one table generation run.
//
// Defaults produce a 100x100 grid over p in [0, 200], l in [-200, 200]
// around a unit-mass body, integrated with step bound 0.1 out to R = 300.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    // Write the generated table to disk
    pub save: bool,

    // Directory the table file is written into
    pub save_directory: PathBuf,

    // Caller-supplied prefix prepended to the generated filename
    pub filename_prefix: String,

    // Grid resolution per axis (the adaptive p-axis uses multiples of this)
    pub num: usize,

    // Impact-parameter range [p_start, p_end]
    pub p_range: [f64; 2],

    // Angular-parameter range [l_start, l_end]
    pub l_range: [f64; 2],

    // Refine the p-axis near the critical radius instead of sampling
    // uniformly
    pub adapt_grid: bool,

    // Coordinate chart the integrator is expected to work in
    pub coordinates: CoordinateSystem,

    // Central mass in geometric units
    pub m: f64,

    // Integrator step-size bound, forwarded per call
    pub max_step: f64,

    // Integration termination radius, forwarded per call
    pub r_end: f64,

    // Emit per-cell diagnostics while sweeping
    pub verbose: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            save: true,
            save_directory: PathBuf::from("."),
            filename_prefix: String::new(),
            num: 100,
            p_range: [0.0, 200.0],
            l_range: [-200.0, 200.0],
            adapt_grid: false,
            coordinates: CoordinateSystem::Spherical,
            m: 1.0,
            max_step: 0.1,
            r_end: 300.0,
            verbose: false,
        }
    }
}

impl SamplerConfig {
    // Schwarzschild radius R_sch = 2M of the central body
    #[inline]
    pub fn schwarzschild_radius(&self) -> f64 {
        2.0 * self.m
    }

    // Fail fast on degenerate configurations before any integration runs.
    //
    // Adaptive mode additionally pins the sub-range boundaries: the
    // concatenated axis must stay non-decreasing end-to-end, which requires
    // p_start at or below R_sch and p_end beyond the 5*R_sch split.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num < 1 {
            return Err(ConfigError::Resolution { num: self.num });
        }

        let [p_start, p_end] = self.p_range;
        if !(p_start < p_end) {
            return Err(ConfigError::Range {
                axis: "p",
                start: p_start,
                end: p_end,
            });
        }
        let [l_start, l_end] = self.l_range;
        if !(l_start < l_end) {
            return Err(ConfigError::Range {
                axis: "l",
                start: l_start,
                end: l_end,
            });
        }

        for (name, value) in [
            ("m", self.m),
            ("max_step", self.max_step),
            ("r_end", self.r_end),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.adapt_grid {
            let r_sch = self.schwarzschild_radius();
            let split = 5.0 * r_sch + crate::grid::ADAPTIVE_EPS;
            if p_start > r_sch || p_end <= split {
                return Err(ConfigError::AdaptiveRange {
                    start: p_start,
                    end: p_end,
                    m: self.m,
                });
            }
        }

        Ok(())
    }
}

// Configuration errors caught before the sweep starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid resolution must be at least 1, got {num}")]
    Resolution { num: usize },

    #[error("malformed {axis} range: start {start} must lie below end {end}")]
    Range {
        axis: &'static str,
        start: f64,
        end: f64,
    },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error(
        "adaptive grid needs p_start <= 2m and p_end > 10m + eps, \
         got p = [{start}, {end}] with m = {m}"
    )]
    AdaptiveRange { start: f64, end: f64, m: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SamplerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let config = SamplerConfig {
            p_range: [10.0, 10.0],
            ..SamplerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Range { axis: "p", .. })
        ));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let config = SamplerConfig {
            num: 0,
            ..SamplerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Resolution { num: 0 })
        ));
    }

    #[test]
    fn test_nonpositive_mass_rejected() {
        let config = SamplerConfig {
            m: 0.0,
            ..SamplerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "m", .. })
        ));
    }

    #[test]
    fn test_adaptive_needs_room_past_split() {
        // p_end below 5*R_sch would make the third sub-range run backwards
        let config = SamplerConfig {
            adapt_grid: true,
            p_range: [0.0, 8.0],
            m: 1.0,
            ..SamplerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AdaptiveRange { .. })
        ));

        let config = SamplerConfig {
            adapt_grid: true,
            p_range: [0.0, 200.0],
            ..SamplerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
