// Ray geometry: deflection angles and the impact-vector basis

use nalgebra::Vector3;
use thiserror::Error;

// Below this fraction of |origin| the perpendicular component is treated as
// zero and the decomposition degenerates (see impact_vector)
const PARALLEL_TOL: f64 = 1e-12;

// Errors for degenerate input geometry
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{name} vector has zero length")]
    ZeroVector { name: &'static str },
}

// ============================================================================
// ANGLE BETWEEN DIRECTIONS
// ============================================================================

// Unsigned angle in [0, pi] between two direction vectors.
//
// acos alone cannot distinguish a rotation from its reflection, so the
// result carries no orientation; callers supply the sign separately (see
// sample::curve_props). The normalized dot product is clamped to [-1, 1] so
// rounding at (anti)parallel inputs never produces NaN.
pub fn angle(v_start: &Vector3<f64>, v_end: &Vector3<f64>) -> Result<f64, GeometryError> {
    let n_start = v_start.norm();
    if n_start == 0.0 {
        return Err(GeometryError::ZeroVector {
            name: "start direction",
        });
    }
    let n_end = v_end.norm();
    if n_end == 0.0 {
        return Err(GeometryError::ZeroVector {
            name: "end direction",
        });
    }

    let cos = (v_start.dot(v_end) / (n_start * n_end)).clamp(-1.0, 1.0);
    Ok(cos.acos())
}

// ============================================================================
// IMPACT-VECTOR DECOMPOSITION
// ============================================================================

// Decomposition of a ray origin against its direction of travel:
//
//   origin = l * l_hat + p * p_hat
//
// l_hat is the unit direction of travel, p_hat the unit vector toward the
// ray's perpendicular offset from the central body. p is the impact
// parameter, l the along-track coordinate. p_hat and l_hat are orthonormal
// and span the plane the deflection happens in; the sign convention of
// p_hat is what disambiguates clockwise from counter-clockwise deflection
// downstream.
#[derive(Debug, Clone, Copy)]
pub struct ImpactDecomposition {
    // Impact-parameter magnitude |origin - l * l_hat|
    pub p: f64,

    // Along-track coordinate origin . l_hat
    pub l: f64,

    // Unit vector in the impact direction
    pub p_hat: Vector3<f64>,

    // Unit vector along the initial direction of travel
    pub l_hat: Vector3<f64>,
}

// Decompose a ray's origin and initial direction into the impact basis.
//
// Boundary condition: a direction parallel to the origin has no impact
// direction of its own (p = 0). The decomposition is still well-defined --
// p is reported as exactly zero and p_hat falls back to a deterministic
// unit vector orthogonal to l_hat -- so a head-on ray never yields NaN.
// Zero-length inputs are rejected outright.
pub fn impact_vector(
    origin: &Vector3<f64>,
    direction: &Vector3<f64>,
) -> Result<ImpactDecomposition, GeometryError> {
    let origin_norm = origin.norm();
    if origin_norm == 0.0 {
        return Err(GeometryError::ZeroVector { name: "origin" });
    }
    if direction.norm() == 0.0 {
        return Err(GeometryError::ZeroVector { name: "direction" });
    }

    let l_hat = direction.normalize();
    let l = origin.dot(&l_hat);

    let perpendicular = origin - l * l_hat;
    let p = perpendicular.norm();

    if p <= PARALLEL_TOL * origin_norm {
        return Ok(ImpactDecomposition {
            p: 0.0,
            l,
            p_hat: any_orthogonal_unit(&l_hat),
            l_hat,
        });
    }

    Ok(ImpactDecomposition {
        p,
        l,
        p_hat: perpendicular / p,
        l_hat,
    })
}

// Deterministic unit vector orthogonal to a unit vector v: cross v with
// whichever coordinate axis it is least aligned with.
fn any_orthogonal_unit(v: &Vector3<f64>) -> Vector3<f64> {
    let axis = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&axis).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_angle_known_values() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 2.0, 0.0);

        assert_relative_eq!(angle(&x, &x).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(angle(&x, &y).unwrap(), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(angle(&x, &-x).unwrap(), PI, epsilon = 1e-12);

        // 60 degrees, independent of magnitudes
        let v = Vector3::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0) * 7.0;
        assert_relative_eq!(angle(&x, &v).unwrap(), PI / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_zero_vector_fails() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let zero = Vector3::zeros();
        assert!(matches!(
            angle(&zero, &x),
            Err(GeometryError::ZeroVector {
                name: "start direction"
            })
        ));
        assert!(matches!(
            angle(&x, &zero),
            Err(GeometryError::ZeroVector {
                name: "end direction"
            })
        ));
    }

    #[test]
    fn test_angle_never_nan_on_near_parallel() {
        // Rounding can push the normalized dot product past 1.0
        let a = Vector3::new(0.1, 0.2, 0.3);
        let b = a * 3.000000000000001;
        let theta = angle(&a, &b).unwrap();
        assert!(theta.is_finite());
        assert_relative_eq!(theta, 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_impact_vector_recovers_grid_ray() {
        // The sweep constructs origin = (-l, p, 0) with direction (-1, 0, 0);
        // the decomposition must hand back exactly those scalars
        let origin = Vector3::new(-5.0, 3.0, 0.0);
        let direction = Vector3::new(-1.0, 0.0, 0.0);
        let dec = impact_vector(&origin, &direction).unwrap();

        assert_relative_eq!(dec.p, 3.0, epsilon = 1e-12);
        assert_relative_eq!(dec.l, 5.0, epsilon = 1e-12);
        assert_relative_eq!(dec.p_hat, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(dec.l_hat, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_impact_vector_basis_invariants() {
        let origin = Vector3::new(2.0, -7.0, 4.0);
        let direction = Vector3::new(0.3, 0.1, -0.9);
        let dec = impact_vector(&origin, &direction).unwrap();

        assert_relative_eq!(dec.p_hat.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dec.l_hat.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dec.p_hat.dot(&dec.l_hat), 0.0, epsilon = 1e-12);

        // origin = l * l_hat + p * p_hat
        let rebuilt = dec.l * dec.l_hat + dec.p * dec.p_hat;
        assert_relative_eq!(rebuilt, origin, epsilon = 1e-10);
        assert!(dec.p >= 0.0);
    }

    #[test]
    fn test_impact_vector_parallel_is_degenerate_not_nan() {
        // Head-on ray: direction parallel to origin, zero impact parameter
        let origin = Vector3::new(10.0, 0.0, 0.0);
        let direction = Vector3::new(-1.0, 0.0, 0.0);
        let dec = impact_vector(&origin, &direction).unwrap();

        assert_eq!(dec.p, 0.0);
        assert_relative_eq!(dec.l, -10.0, epsilon = 1e-12);
        assert_relative_eq!(dec.p_hat.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dec.p_hat.dot(&dec.l_hat), 0.0, epsilon = 1e-12);
        assert!(dec.p_hat.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_impact_vector_zero_inputs_fail() {
        let v = Vector3::new(1.0, 0.0, 0.0);
        let zero = Vector3::zeros();
        assert!(matches!(
            impact_vector(&zero, &v),
            Err(GeometryError::ZeroVector { name: "origin" })
        ));
        assert!(matches!(
            impact_vector(&v, &zero),
            Err(GeometryError::ZeroVector { name: "direction" })
        ));
    }

    #[test]
    fn test_any_orthogonal_unit_covers_all_octants() {
        for v in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(-0.6, 0.48, 0.64),
        ] {
            let u = any_orthogonal_unit(&v);
            assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
        }
    }
}
