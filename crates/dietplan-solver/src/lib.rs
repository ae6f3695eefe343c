mod error;
mod problem;
mod simplex;
mod solution;
mod tableau;

pub use error::SolverError;
pub use problem::{ConstraintGroup, ConstraintOp, LpProblem};
pub use simplex::Solver;
pub use solution::{Solution, SolutionStatus};
pub use tableau::{BigM, Column, Row, Tableau};
