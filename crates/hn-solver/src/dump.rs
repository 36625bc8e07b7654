//! CSV dump of a linear system that failed to solve.

use std::path::Path;

use crate::error::{SolverError, SolverResult};
use hn_core::{Real, UNKNOWNS_PER_POINT};
use nalgebra::{DMatrix, DVector};

const COLUMN_PREFIXES: [&str; UNKNOWNS_PER_POINT] = ["mass_flow", "pressure", "internal_energy"];

/// Column headers: `mass_flow_0, pressure_0, internal_energy_0, ..., rhs`,
/// one triple per unknown point.
pub fn headers(unknowns: usize) -> Vec<String> {
    let mut names: Vec<String> = (0..unknowns)
        .map(|col| {
            let point = col / UNKNOWNS_PER_POINT;
            format!("{}_{}", COLUMN_PREFIXES[col % UNKNOWNS_PER_POINT], point)
        })
        .collect();
    names.push("rhs".to_string());
    names
}

/// Write `[A | b]` densely, one row per equation.
pub fn write_system(path: &Path, a: &DMatrix<Real>, b: &DVector<Real>) -> SolverResult<()> {
    let to_dump_err = |e: csv::Error| SolverError::Dump {
        what: format!("{}: {e}", path.display()),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_dump_err)?;
    writer.write_record(headers(a.ncols())).map_err(to_dump_err)?;
    for (i, row) in a.row_iter().enumerate() {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(b[i].to_string());
        writer.write_record(&record).map_err(to_dump_err)?;
    }
    writer.flush().map_err(|e| SolverError::Dump {
        what: format!("{}: {e}", path.display()),
    })?;
    Ok(())
}
