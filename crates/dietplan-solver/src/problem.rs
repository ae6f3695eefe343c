/// A linear program to be maximized:
///
/// ```text
/// maximize   objective · x
/// subject to greater.lhs · x >= greater.rhs
///            less.lhs    · x <= less.rhs
///            equal.lhs   · x  = equal.rhs
///            x >= 0
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpProblem {
    /// Objective function coefficients, one per decision variable
    pub objective: Vec<f64>,
    /// `>=` rows
    pub greater: ConstraintGroup,
    /// `<=` rows
    pub less: ConstraintGroup,
    /// `=` rows
    pub equal: ConstraintGroup,
}

/// A block of constraints sharing one comparison operator.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintGroup {
    /// Left-hand side, one row of coefficients per constraint
    pub lhs: Vec<Vec<f64>>,
    /// Right-hand side, one value per constraint
    pub rhs: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }

    pub(crate) fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

impl std::fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl ConstraintGroup {
    pub fn new(lhs: Vec<Vec<f64>>, rhs: Vec<f64>) -> Self {
        Self { lhs, rhs }
    }

    pub fn push(&mut self, coefficients: Vec<f64>, rhs: f64) {
        self.lhs.push(coefficients);
        self.rhs.push(rhs);
    }

    pub fn len(&self) -> usize {
        self.lhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lhs.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&[f64], f64)> {
        self.lhs.iter().map(Vec::as_slice).zip(self.rhs.iter().copied())
    }
}

impl LpProblem {
    pub fn new(objective: Vec<f64>) -> Self {
        Self {
            objective,
            ..Self::default()
        }
    }

    /// Builds a problem from pre-assembled constraint blocks.
    pub fn from_groups(
        objective: Vec<f64>,
        greater: ConstraintGroup,
        less: ConstraintGroup,
        equal: ConstraintGroup,
    ) -> Self {
        Self {
            objective,
            greater,
            less,
            equal,
        }
    }

    pub fn add_constraint(&mut self, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.group_mut(op).push(coefficients, rhs);
    }

    pub fn group(&self, op: ConstraintOp) -> &ConstraintGroup {
        match op {
            ConstraintOp::Ge => &self.greater,
            ConstraintOp::Le => &self.less,
            ConstraintOp::Eq => &self.equal,
        }
    }

    fn group_mut(&mut self, op: ConstraintOp) -> &mut ConstraintGroup {
        match op {
            ConstraintOp::Ge => &mut self.greater,
            ConstraintOp::Le => &mut self.less,
            ConstraintOp::Eq => &mut self.equal,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.greater.len() + self.less.len() + self.equal.len()
    }

    /// Returns an equivalent problem whose right-hand sides are all non-negative.
    ///
    /// Rows with a negative rhs are negated, which swaps `<=` and `>=`.
    /// Row order inside each group is preserved; moved rows are appended to
    /// the opposite group.
    pub fn normalized(&self) -> LpProblem {
        let mut out = LpProblem::new(self.objective.clone());
        for op in [ConstraintOp::Ge, ConstraintOp::Le, ConstraintOp::Eq] {
            for (coefficients, rhs) in self.group(op).rows() {
                if rhs < 0.0 {
                    let negated = coefficients.iter().map(|c| -c).collect();
                    out.add_constraint(negated, op.flipped(), -rhs);
                } else {
                    out.add_constraint(coefficients.to_vec(), op, rhs);
                }
            }
        }
        out
    }

    /// Evaluates `objective · values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_constraint_routes_by_operator() {
        let mut problem = LpProblem::new(vec![1.0, 2.0]);
        problem.add_constraint(vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint(vec![1.0, 0.0], ConstraintOp::Ge, 1.0);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Eq, 2.0);
        problem.add_constraint(vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        assert_eq!(problem.less.len(), 2);
        assert_eq!(problem.greater.len(), 1);
        assert_eq!(problem.equal.len(), 1);
        assert_eq!(problem.num_constraints(), 4);
        assert_eq!(problem.less.rhs, vec![4.0, 3.0]);
    }

    #[test]
    fn test_normalized_flips_negative_rows() {
        let mut problem = LpProblem::new(vec![1.0]);
        problem.add_constraint(vec![-1.0], ConstraintOp::Le, -2.0);
        problem.add_constraint(vec![1.0], ConstraintOp::Le, 5.0);
        problem.add_constraint(vec![-1.0], ConstraintOp::Eq, -3.0);

        let normalized = problem.normalized();
        assert_eq!(normalized.greater.lhs, vec![vec![1.0]]);
        assert_eq!(normalized.greater.rhs, vec![2.0]);
        assert_eq!(normalized.less.rhs, vec![5.0]);
        assert_eq!(normalized.equal.lhs, vec![vec![1.0]]);
        assert_eq!(normalized.equal.rhs, vec![3.0]);
    }
}
