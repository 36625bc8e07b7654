//! Sparse solve engine owning the global unknown vector.

use std::path::PathBuf;

use crate::dump;
use crate::error::{SolverError, SolverResult};
use hn_core::numeric::within_tolerance;
use hn_core::{Equation, Real, Tolerances};
use faer::Col;
use faer::prelude::Solve;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CscMatrix, coo::CooMatrix};
use tracing::{error, trace};

/// Global unknown vector plus the previous iterate.
///
/// Blocks handed out by [`Matrix::add_unknowns`] never move; the vector only
/// grows.
#[derive(Debug, Clone)]
pub struct Matrix {
    current: Vec<Real>,
    previous: Vec<Real>,
    tolerances: Tolerances,
    dump_path: PathBuf,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

impl Matrix {
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
            previous: Vec::new(),
            tolerances: Tolerances::default(),
            dump_path: std::env::temp_dir().join("hn_singular_matrix.csv"),
        }
    }

    pub fn set_tolerances(&mut self, tolerances: Tolerances) {
        self.tolerances = tolerances;
    }

    pub fn set_dump_path(&mut self, path: impl Into<PathBuf>) {
        self.dump_path = path.into();
    }

    pub fn num_unknowns(&self) -> usize {
        self.current.len()
    }

    /// Reserve `n` unknowns and return the index of the first.
    pub fn add_unknowns(&mut self, n: usize) -> SolverResult<usize> {
        if n < 1 {
            return Err(SolverError::InvalidUnknownCount { requested: n });
        }
        let start = self.current.len();
        self.current.resize(start + n, 1.0);
        self.previous.resize(start + n, 0.0);
        Ok(start)
    }

    /// Solve one linearised system; needs exactly one equation per unknown.
    pub fn solve(&mut self, equations: &[Equation]) -> SolverResult<&[Real]> {
        let n = self.num_unknowns();
        if n == 0 {
            return Err(SolverError::NoUnknowns);
        }
        if equations.len() != n {
            return Err(SolverError::EquationCount {
                equations: equations.len(),
                unknowns: n,
            });
        }

        let mut coo = CooMatrix::new(n, n);
        let mut rhs = vec![0.0; n];
        for (row, eq) in equations.iter().enumerate() {
            eq.check(n)
                .map_err(|source| SolverError::InvalidEquation { row, source })?;
            for (&col, &value) in eq.indices.iter().zip(&eq.coefficients) {
                coo.push(row, col, value);
            }
            rhs[row] = eq.rhs;
        }
        trace!(unknowns = n, nnz = coo.nnz(), "assembled system");

        // duplicate triplets are summed by the conversion
        let csc = CscMatrix::from(&coo);
        match sparse_lu_solve(&csc, &rhs) {
            Some(x) => {
                self.previous = std::mem::replace(&mut self.current, x);
                Ok(&self.current)
            }
            None => Err(self.dump_singular(&csc, &rhs)),
        }
    }

    fn dump_singular(&self, csc: &CscMatrix<Real>, rhs: &[Real]) -> SolverError {
        let dense = DMatrix::from(csc);
        let rhs = DVector::from_column_slice(rhs);
        match dump::write_system(&self.dump_path, &dense, &rhs) {
            Ok(()) => {
                error!(path = %self.dump_path.display(), "singular matrix, system dumped");
                SolverError::SingularMatrix {
                    dump: Some(self.dump_path.clone()),
                }
            }
            Err(e) => {
                error!(error = %e, "singular matrix, dump failed");
                SolverError::SingularMatrix { dump: None }
            }
        }
    }

    /// Element-wise `|new - old| <= abs + rel·|old|`.
    pub fn is_converged(&self) -> SolverResult<bool> {
        if self.current.is_empty() {
            return Err(SolverError::NoUnknowns);
        }
        Ok(self
            .current
            .iter()
            .zip(&self.previous)
            .all(|(&new, &old)| within_tolerance(new, old, self.tolerances)))
    }

    /// Largest absolute change between the last two iterates.
    pub fn max_change(&self) -> Real {
        self.current
            .iter()
            .zip(&self.previous)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, Real::max)
    }

    pub fn get_solution(&self, index: usize, count: usize) -> SolverResult<&[Real]> {
        let end = index.checked_add(count).unwrap_or(usize::MAX);
        if end > self.current.len() {
            return Err(hn_core::HnError::IndexOob {
                what: "solution slice",
                index: end,
                len: self.current.len(),
            }
            .into());
        }
        Ok(&self.current[index..end])
    }

    pub fn solution(&self) -> &[Real] {
        &self.current
    }

    /// Restart the iteration from all ones.
    pub fn reset_solution(&mut self) {
        self.current.iter_mut().for_each(|v| *v = 1.0);
    }
}

/// LU-factorise the CSC system and solve it. `None` when the matrix is
/// singular or the solution is not finite.
fn sparse_lu_solve(csc: &CscMatrix<Real>, rhs: &[Real]) -> Option<Vec<Real>> {
    let n = csc.ncols();
    let symbolic = SymbolicSparseColMat::<usize>::new_checked(
        csc.nrows(),
        n,
        csc.col_offsets().to_vec(),
        None,
        csc.row_indices().to_vec(),
    );
    let a = SparseColMat::<usize, Real>::new(symbolic, csc.values().to_vec());
    let lu = match a.as_ref().sp_lu() {
        Ok(lu) => lu,
        Err(e) => {
            trace!(error = ?e, "sparse LU failed");
            return None;
        }
    };
    let b = Col::<Real>::from_fn(n, |i| rhs[i]);
    let x = lu.solve(&b);
    let x: Vec<Real> = (0..n).map(|i| x[i]).collect();
    x.iter().all(|v| v.is_finite()).then_some(x)
}
