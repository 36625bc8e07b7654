//! One linearised row of the network system.

use crate::error::{HnError, HnResult};
use crate::numeric::{Real, ensure_finite};

/// `Σ coefficients[i] · x[indices[i]] = rhs`.
///
/// Rows are rebuilt every iteration; coefficients close over the previous
/// iterate, so an `Equation` is only valid for the iteration that built it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Equation {
    pub indices: Vec<usize>,
    pub coefficients: Vec<Real>,
    pub rhs: Real,
}

impl Equation {
    pub fn new(indices: Vec<usize>, coefficients: Vec<Real>, rhs: Real) -> Self {
        Self {
            indices,
            coefficients,
            rhs,
        }
    }

    /// Fix a single unknown: `x[index] = value`.
    pub fn prescribe(index: usize, value: Real) -> Self {
        Self::new(vec![index], vec![1.0], value)
    }

    /// Tie two unknowns together: `x[a] - x[b] = 0`.
    pub fn difference(a: usize, b: usize) -> Self {
        Self::new(vec![a, b], vec![1.0, -1.0], 0.0)
    }

    /// Append a term to the left-hand side.
    pub fn with_term(mut self, index: usize, coefficient: Real) -> Self {
        self.push_term(index, coefficient);
        self
    }

    pub fn push_term(&mut self, index: usize, coefficient: Real) {
        self.indices.push(index);
        self.coefficients.push(coefficient);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Check structural consistency against a system of `unknowns` columns.
    pub fn check(&self, unknowns: usize) -> HnResult<()> {
        if self.indices.len() != self.coefficients.len() {
            return Err(HnError::Invariant {
                what: "equation indices and coefficients differ in length",
            });
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i >= unknowns) {
            return Err(HnError::IndexOob {
                what: "equation column",
                index: bad,
                len: unknowns,
            });
        }
        for &c in &self.coefficients {
            ensure_finite(c, "equation coefficient")?;
        }
        ensure_finite(self.rhs, "equation right-hand side")?;
        Ok(())
    }

    /// `lhs(x) - rhs`; zero when the row is satisfied.
    pub fn residual(&self, x: &[Real]) -> Real {
        let lhs: Real = self
            .indices
            .iter()
            .zip(&self.coefficients)
            .map(|(&i, &c)| c * x.get(i).copied().unwrap_or(Real::NAN))
            .sum();
        lhs - self.rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescribe_is_single_term() {
        let eq = Equation::prescribe(4, 2.5);
        assert_eq!(eq.indices, vec![4]);
        assert_eq!(eq.coefficients, vec![1.0]);
        assert_eq!(eq.rhs, 2.5);
    }

    #[test]
    fn difference_residual_vanishes_on_equal_values() {
        let eq = Equation::difference(0, 2);
        assert_eq!(eq.residual(&[3.0, 9.0, 3.0]), 0.0);
        assert_eq!(eq.residual(&[3.0, 9.0, 1.0]), 2.0);
    }

    #[test]
    fn check_rejects_out_of_range_column() {
        let eq = Equation::prescribe(5, 1.0);
        assert!(matches!(
            eq.check(3),
            Err(HnError::IndexOob { index: 5, len: 3, .. })
        ));
    }

    #[test]
    fn check_rejects_ragged_row() {
        let eq = Equation::new(vec![0, 1], vec![1.0], 0.0);
        assert!(eq.check(2).is_err());
    }

    #[test]
    fn check_rejects_nan_coefficient() {
        let eq = Equation::prescribe(0, 1.0).with_term(1, f64::NAN);
        assert!(matches!(eq.check(2), Err(HnError::NonFinite { .. })));
    }

    #[test]
    fn check_names_infinite_rhs() {
        let eq = Equation::prescribe(0, f64::INFINITY);
        assert_eq!(
            eq.check(1),
            Err(HnError::NonFinite {
                what: "equation right-hand side",
                value: f64::INFINITY
            })
        );
    }
}
