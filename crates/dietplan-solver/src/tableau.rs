use crate::error::SolverError;
use crate::problem::{ConstraintOp, LpProblem};

/// Multiplier applied to the largest objective coefficient when Big-M is derived.
const AUTO_BIG_M_SCALE: f64 = 1e6;

/// Penalty attached to artificial variables in the objective row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BigM {
    /// Derive the penalty from the objective magnitudes
    #[default]
    Auto,
    /// Use the given penalty
    Fixed(f64),
}

impl BigM {
    /// Resolves the penalty for a given objective vector.
    pub fn resolve(self, objective: &[f64]) -> Result<f64, SolverError> {
        match self {
            BigM::Auto => {
                let largest = objective.iter().fold(1.0_f64, |acc, c| acc.max(c.abs()));
                Ok(AUTO_BIG_M_SCALE * largest)
            }
            BigM::Fixed(m) if m.is_finite() && m > 0.0 => Ok(m),
            BigM::Fixed(m) => Err(SolverError::InvalidBigM(m)),
        }
    }
}

/// What a tableau column stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Original decision variable with its index in the objective
    Decision(usize),
    /// `<=` slack, +1 in its constraint row
    Slack { row: usize },
    /// `>=` surplus, -1 in its constraint row
    Surplus { row: usize },
    /// Big-M artificial for a `>=` or `=` row
    Artificial { row: usize },
    /// Coefficient of the objective value itself
    ObjectiveValue,
    /// Right-hand side
    Rhs,
}

/// What a tableau row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    /// Constraint `index` of the group with operator `op`
    Constraint { op: ConstraintOp, index: usize },
    /// Big-M part of the objective, in multiples of M
    Penalty,
    /// Real-cost part of the objective
    Objective,
}

/// Dense simplex tableau in standard form.
///
/// Rows are laid out as `[>= rows][<= rows][= rows][penalty][objective]` and
/// columns as `[decision][surplus/slack][artificial][objective value][rhs]`.
///
/// The objective is `cost + M * penalty`. The two parts are kept in separate
/// rows so that entries of the size of M never absorb the real costs.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    columns: Vec<Column>,
    rows: Vec<Row>,
    n_vars: usize,
    big_m: f64,
}

impl Tableau {
    /// Assembles the tableau for maximizing `problem.objective`.
    pub fn build(problem: &LpProblem, big_m: BigM) -> Result<Self, SolverError> {
        validate(problem)?;
        let big_m = big_m.resolve(&problem.objective)?;
        let problem = problem.normalized();

        let n_vars = problem.num_variables();
        let n_ge = problem.greater.len();
        let n_le = problem.less.len();
        let n_eq = problem.equal.len();

        let mut rows = Vec::with_capacity(n_ge + n_le + n_eq + 2);
        for op in [ConstraintOp::Ge, ConstraintOp::Le, ConstraintOp::Eq] {
            rows.extend((0..problem.group(op).len()).map(|index| Row::Constraint { op, index }));
        }
        rows.push(Row::Penalty);
        rows.push(Row::Objective);

        let mut columns: Vec<Column> = (0..n_vars).map(Column::Decision).collect();
        columns.extend((0..n_ge).map(|row| Column::Surplus { row }));
        columns.extend((n_ge..n_ge + n_le).map(|row| Column::Slack { row }));
        columns.extend((0..n_ge).map(|row| Column::Artificial { row }));
        columns.extend((n_ge + n_le..n_ge + n_le + n_eq).map(|row| Column::Artificial { row }));
        columns.push(Column::ObjectiveValue);
        columns.push(Column::Rhs);

        let mut tableau = Tableau {
            data: vec![vec![0.0; columns.len()]; rows.len()],
            columns,
            rows,
            n_vars,
            big_m,
        };

        let penalty_row = tableau.penalty_row();
        let obj_row = tableau.objective_row();
        let rhs_col = tableau.rhs_col();

        let constraint_rows = problem
            .greater
            .rows()
            .chain(problem.less.rows())
            .chain(problem.equal.rows());
        for (i, (coefficients, rhs)) in constraint_rows.enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(coefficients);
            tableau.data[i][rhs_col] = rhs;
        }

        // Maximization is carried out by minimizing the negated objective
        for (j, &coef) in problem.objective.iter().enumerate() {
            tableau.data[obj_row][j] = -coef;
        }

        for j in 0..tableau.columns.len() {
            match tableau.columns[j] {
                Column::Slack { row } => tableau.data[row][j] = 1.0,
                Column::Surplus { row } => tableau.data[row][j] = -1.0,
                Column::Artificial { row } => {
                    tableau.data[row][j] = 1.0;
                    tableau.data[penalty_row][j] = 1.0;
                }
                Column::ObjectiveValue => tableau.data[obj_row][j] = 1.0,
                Column::Decision(_) | Column::Rhs => {}
            }
        }

        tableau.eliminate_artificial_costs();
        Ok(tableau)
    }

    /// Cancels the penalty entries of the artificial columns against their own
    /// rows, leaving reduced penalties.
    fn eliminate_artificial_costs(&mut self) {
        let penalty_row = self.penalty_row();
        for j in 0..self.columns.len() {
            let Column::Artificial { row } = self.columns[j] else {
                continue;
            };
            let factor = self.data[penalty_row][j] / self.data[row][j];
            if factor == 0.0 {
                continue;
            }
            let source = self.data[row].clone();
            for (target, value) in self.data[penalty_row].iter_mut().zip(&source) {
                *target -= factor * value;
            }
        }
    }

    /// Reduced cost of `col`, with the penalty part weighted by M.
    ///
    /// Penalty entries within `tolerance` of zero count as zero, so round-off
    /// in the penalty row is never multiplied up to the scale of M.
    pub fn reduced_cost(&self, col: usize, tolerance: f64) -> f64 {
        let penalty = self.data[self.penalty_row()][col];
        let cost = self.data[self.objective_row()][col];
        if penalty.abs() <= tolerance {
            cost
        } else {
            self.big_m * penalty + cost
        }
    }

    /// Normalizes the pivot row and eliminates `col` from every other row.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let pivot_val = self.data[row][col];
        for value in &mut self.data[row] {
            *value /= pivot_val;
        }
        let pivot_row = self.data[row].clone();

        for (i, target) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = target[col];
            if factor == 0.0 {
                continue;
            }
            for (value, p) in target.iter_mut().zip(&pivot_row) {
                *value -= factor * p;
            }
            target[col] = 0.0;
        }
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.data.len() - 2
    }

    pub fn num_variables(&self) -> usize {
        self.n_vars
    }

    pub fn penalty_row(&self) -> usize {
        self.data.len() - 2
    }

    pub fn objective_row(&self) -> usize {
        self.data.len() - 1
    }

    pub fn objective_col(&self) -> usize {
        self.columns.len() - 2
    }

    pub fn rhs_col(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn big_m(&self) -> f64 {
        self.big_m
    }
}

fn validate(problem: &LpProblem) -> Result<(), SolverError> {
    let n = problem.num_variables();
    if n == 0 {
        return Err(SolverError::EmptyObjective);
    }
    check_finite(&problem.objective, || "objective".to_string())?;

    for op in [ConstraintOp::Ge, ConstraintOp::Le, ConstraintOp::Eq] {
        let group = problem.group(op);
        if group.lhs.len() != group.rhs.len() {
            return Err(SolverError::RhsLengthMismatch {
                op,
                rows: group.lhs.len(),
                rhs: group.rhs.len(),
            });
        }
        for (row, coefficients) in group.lhs.iter().enumerate() {
            if coefficients.len() != n {
                return Err(SolverError::RowLengthMismatch {
                    op,
                    row,
                    expected: n,
                    found: coefficients.len(),
                });
            }
            check_finite(coefficients, || format!("{} row {}", op.symbol(), row))?;
        }
        check_finite(&group.rhs, || format!("{} right-hand side", op.symbol()))?;
    }
    Ok(())
}

fn check_finite(values: &[f64], location: impl Fn() -> String) -> Result<(), SolverError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(SolverError::NonFinite {
            location: location(),
            value,
        }),
        None => Ok(()),
    }
}
