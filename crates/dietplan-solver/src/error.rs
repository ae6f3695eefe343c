use thiserror::Error;

use crate::problem::ConstraintOp;

/// Contract violations and solver faults.
///
/// Infeasible and unbounded programs are not errors; they are reported
/// through [`crate::SolutionStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Objective has no coefficients")]
    EmptyObjective,
    #[error("Row {row} of the {op} group has {found} coefficients, expected {expected}")]
    RowLengthMismatch {
        op: ConstraintOp,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("The {op} group has {rows} rows but {rhs} right-hand side values")]
    RhsLengthMismatch { op: ConstraintOp, rows: usize, rhs: usize },
    #[error("Non-finite coefficient {value} in {location}")]
    NonFinite { location: String, value: f64 },
    #[error("Invalid Big-M value {0}")]
    InvalidBigM(f64),
    #[error("Constraint row {0} has no basic column")]
    MissingBasis(usize),
    #[error("Iteration limit of {0} pivots reached")]
    IterationLimit(usize),
}
