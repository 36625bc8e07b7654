use crate::HnError;

/// Scalar type of every unknown, coefficient and parameter.
pub type Real = f64;

/// Convergence band between two successive iterates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-6,
            rel: 1e-6,
        }
    }
}

/// `|a - b| <= abs + rel * |b|`, with `b` the reference value.
pub fn within_tolerance(a: Real, b: Real, tol: Tolerances) -> bool {
    (a - b).abs() <= tol.abs + tol.rel * b.abs()
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HnError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HnError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_scales_with_reference() {
        let tol = Tolerances::default();
        assert!(within_tolerance(1e6 + 0.5, 1e6, tol));
        assert!(!within_tolerance(1e6 + 2.0, 1e6, tol));
        assert!(within_tolerance(5e-7, 0.0, tol));
        assert!(!within_tolerance(2e-6, 0.0, tol));
    }

    #[test]
    fn infinite_pressure_is_rejected() {
        let err = ensure_finite(Real::INFINITY, "pressure").unwrap_err();
        assert_eq!(
            err,
            HnError::NonFinite {
                what: "pressure",
                value: Real::INFINITY
            }
        );
    }
}
