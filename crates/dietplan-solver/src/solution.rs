/// The result of solving an LP problem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each decision variable (empty unless optimal)
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Number of pivots performed
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies every constraint
    Infeasible,
    /// The objective can grow without limit
    Unbounded,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64, iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
        }
    }

    pub fn infeasible(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            iterations,
        }
    }

    pub fn unbounded(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::INFINITY,
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
