use tracing::{debug, trace};

use crate::error::SolverError;
use crate::problem::LpProblem;
use crate::solution::Solution;
use crate::tableau::{BigM, Column, Tableau};

/// Big-M simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Largest artificial level still considered zero at optimality
    feasibility_tolerance: f64,
    /// Penalty on artificial variables
    big_m: BigM,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            feasibility_tolerance: 1e-6,
            big_m: BigM::Auto,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = big_m;
        self
    }

    /// Maximize `problem.objective` subject to its constraints.
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        let mut tableau = Tableau::build(problem, self.big_m)?;
        self.solve_tableau(&mut tableau)
    }

    /// Run the simplex iterations on an assembled tableau.
    pub fn solve_tableau(&self, tableau: &mut Tableau) -> Result<Solution, SolverError> {
        let mut basis = self.initial_basis(tableau)?;

        let rhs_col = tableau.rhs_col();
        if (0..basis.len()).any(|row| tableau.value(row, rhs_col) < 0.0) {
            debug!("negative basic variable in the starting basis");
            return Ok(Solution::infeasible(0));
        }

        let mut iterations = 0;
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, &basis) else {
                break;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                debug!(column = pivot_col, iterations, "unbounded direction");
                return Ok(Solution::unbounded(iterations));
            };
            if iterations >= self.max_iterations {
                return Err(SolverError::IterationLimit(self.max_iterations));
            }

            trace!(row = pivot_row, column = pivot_col, "pivot");
            tableau.pivot(pivot_row, pivot_col);
            basis[pivot_row] = pivot_col;
            iterations += 1;
        }

        for (row, &col) in basis.iter().enumerate() {
            if matches!(tableau.columns()[col], Column::Artificial { .. })
                && tableau.value(row, rhs_col) > self.feasibility_tolerance
            {
                debug!(row, level = tableau.value(row, rhs_col), iterations, "artificial left in basis");
                return Ok(Solution::infeasible(iterations));
            }
        }

        debug!(iterations, "optimal");
        Ok(self.extract_solution(tableau, &basis, iterations))
    }

    /// Finds the starting basis: for each constraint row, the first column whose
    /// only nonzero entry is a 1 in that row.
    fn initial_basis(&self, tableau: &Tableau) -> Result<Vec<usize>, SolverError> {
        let n_constraints = tableau.num_constraints();
        let mut basis = vec![None; tableau.num_constraints()];

        for (col, kind) in tableau.columns().iter().enumerate() {
            if matches!(kind, Column::ObjectiveValue | Column::Rhs) {
                continue;
            }
            let mut nonzero = (0..tableau.num_rows()).filter(|&r| tableau.value(r, col) != 0.0);
            let (Some(row), None) = (nonzero.next(), nonzero.next()) else {
                continue;
            };
            if row >= n_constraints || basis[row].is_some() {
                continue;
            }
            if (tableau.value(row, col) - 1.0).abs() > self.tolerance {
                continue;
            }
            basis[row] = Some(col);
        }

        basis
            .into_iter()
            .enumerate()
            .map(|(row, col)| col.ok_or(SolverError::MissingBasis(row)))
            .collect()
    }

    /// First non-basic column, left to right, with a negative reduced cost.
    fn find_pivot_column(&self, tableau: &Tableau, basis: &[usize]) -> Option<usize> {
        (0..tableau.objective_col())
            .find(|&j| !basis.contains(&j) && tableau.reduced_cost(j, self.tolerance) < -self.tolerance)
    }

    /// Minimum-ratio test; the first row wins ties.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;

        for i in 0..tableau.num_constraints() {
            let val = tableau.value(i, col);
            if val > self.tolerance {
                let ratio = tableau.value(i, rhs_col) / val;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row
    }

    fn extract_solution(&self, tableau: &Tableau, basis: &[usize], iterations: usize) -> Solution {
        let rhs_col = tableau.rhs_col();

        let mut values = vec![0.0; tableau.num_variables()];
        for (row, &col) in basis.iter().enumerate() {
            if let Column::Decision(j) = tableau.columns()[col] {
                values[j] = tableau.value(row, rhs_col);
            }
        }

        // The objective-value column has coefficient +1 against the negated
        // costs, so the objective row's rhs is the maximized value itself.
        // The penalty part is zero once no artificial is left at a positive level.
        let objective_value = tableau.value(tableau.objective_row(), rhs_col);

        Solution::optimal(values, objective_value, iterations)
    }
}
