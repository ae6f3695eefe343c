use dietplan_solver::{ConstraintGroup, LpProblem, SolutionStatus, Solver, SolverError};
use thiserror::Error;
use tracing::warn;

use crate::error::PlanError;
use crate::nutrient::Nutrient;
use crate::plan::{DayPlan, DietEntry};
use crate::product::Product;
use crate::targets::NutrientTargets;

/// Why a candidate set of products could not make a valid day.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("no quantities satisfy the nutrient ranges")]
    Infeasible,
    #[error("linear program is unbounded")]
    Unbounded,
    #[error("solver hit its iteration limit")]
    IterationLimit,
    #[error("{nutrient} total {total:.4} outside [{minimum}, {maximum}]")]
    NutrientOutOfRange {
        nutrient: Nutrient,
        total: f64,
        minimum: f64,
        maximum: f64,
    },
    #[error("product {product} quantity {amount:.4} outside [{minimum}, {maximum}]")]
    ProductOutOfRange {
        product: u64,
        amount: f64,
        minimum: f64,
        maximum: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    Accepted(DayPlan),
    Rejected(Rejection),
}

/// Turns a candidate product set into a day plan by solving for quantities.
#[derive(Debug, Clone)]
pub struct DayEvaluator<'a> {
    targets: &'a NutrientTargets,
    solver: Solver,
    /// Slack allowed when re-checking totals against the targets
    tolerance: f64,
}

impl<'a> DayEvaluator<'a> {
    pub fn new(targets: &'a NutrientTargets, solver: Solver) -> Self {
        Self {
            targets,
            solver,
            tolerance: 1e-4,
        }
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Builds the program: one row per tracked nutrient followed by one row
    /// per product, mirrored in the `<=` and `>=` groups.
    pub fn build_problem(&self, products: &[&Product]) -> LpProblem {
        let n = products.len();
        let mut greater = ConstraintGroup::default();
        let mut less = ConstraintGroup::default();

        for bound in self.targets.bounds() {
            let row: Vec<f64> = products.iter().map(|p| p.intake(bound.nutrient)).collect();
            less.push(row.clone(), bound.maximum);
            greater.push(row, bound.minimum);
        }

        for (i, product) in products.iter().enumerate() {
            let mut row = vec![0.0; n];
            row[i] = 1.0;
            less.push(row.clone(), product.maximum);
            greater.push(row, product.minimum);
        }

        let objective = products.iter().map(|p| p.energy_score()).collect();
        LpProblem::from_groups(objective, greater, less, ConstraintGroup::default())
    }

    pub fn evaluate(&self, products: &[&Product]) -> Result<DayOutcome, PlanError> {
        if products.is_empty() {
            return Err(PlanError::NoCandidates);
        }

        let problem = self.build_problem(products);
        let solution = match self.solver.solve(&problem) {
            Ok(solution) => solution,
            Err(SolverError::IterationLimit(limit)) => {
                warn!(limit, products = products.len(), "day program did not converge");
                return Ok(DayOutcome::Rejected(Rejection::IterationLimit));
            }
            Err(e) => return Err(e.into()),
        };

        match solution.status {
            SolutionStatus::Optimal => {}
            SolutionStatus::Infeasible => return Ok(DayOutcome::Rejected(Rejection::Infeasible)),
            SolutionStatus::Unbounded => {
                // Every product has an upper bound row, so this is a construction fault
                warn!(products = products.len(), "day program reported unbounded");
                return Ok(DayOutcome::Rejected(Rejection::Unbounded));
            }
        }

        for (product, &amount) in products.iter().zip(&solution.values) {
            if amount < product.minimum - self.tolerance || amount > product.maximum + self.tolerance {
                return Ok(DayOutcome::Rejected(Rejection::ProductOutOfRange {
                    product: product.id,
                    amount,
                    minimum: product.minimum,
                    maximum: product.maximum,
                }));
            }
        }

        // Amounts within tolerance of zero are solver round-off
        let entries: Vec<DietEntry> = products
            .iter()
            .zip(&solution.values)
            .filter(|&(_, &amount)| amount > self.tolerance)
            .map(|(&product, &amount)| DietEntry::new(product.clone(), amount))
            .collect();
        let day = DayPlan::new(entries);

        for bound in self.targets.bounds() {
            let total = day.total(bound.nutrient);
            if !bound.contains(total, self.tolerance) {
                return Ok(DayOutcome::Rejected(Rejection::NutrientOutOfRange {
                    nutrient: bound.nutrient,
                    total,
                    minimum: bound.minimum,
                    maximum: bound.maximum,
                }));
            }
        }

        Ok(DayOutcome::Accepted(day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::NutrientBound;

    fn product(id: u64, name: &str, macros: [f64; 4], max: f64) -> Product {
        Product::new(id, name)
            .with_nutrient(Nutrient::Kcals, macros[0])
            .with_nutrient(Nutrient::Proteins, macros[1])
            .with_nutrient(Nutrient::Carbs, macros[2])
            .with_nutrient(Nutrient::Fats, macros[3])
            .with_bounds(0.0, max)
    }

    fn three_products() -> Vec<Product> {
        vec![
            product(1, "a", [500.0, 10.0, 50.0, 10.0], 3.0),
            product(2, "b", [300.0, 40.0, 10.0, 5.0], 4.0),
            product(3, "c", [200.0, 5.0, 5.0, 30.0], 2.0),
        ]
    }

    fn kcal_targets() -> NutrientTargets {
        NutrientTargets::new().with(NutrientBound::with_overshoot(Nutrient::Kcals, 3000.0, 0.1))
    }

    #[test]
    fn test_problem_shape() {
        let targets = NutrientTargets::macros(3000.0, 0.1);
        let products = three_products();
        let refs: Vec<&Product> = products.iter().collect();

        let problem = DayEvaluator::new(&targets, Solver::new()).build_problem(&refs);

        assert_eq!(problem.num_variables(), 3);
        assert_eq!(problem.less.len(), 4 + 3);
        assert_eq!(problem.greater.len(), 4 + 3);
        assert!(problem.equal.is_empty());
        assert!(problem.less.lhs.iter().all(|row| row.len() == 3));

        // Fats row counts 9 kcal per gram
        assert_eq!(problem.less.lhs[3], vec![90.0, 45.0, 270.0]);
        assert!((problem.greater.rhs[3] - 900.0).abs() < 1e-9);
        // Product rows
        assert_eq!(problem.less.lhs[5], vec![0.0, 1.0, 0.0]);
        assert_eq!(problem.less.rhs[5], 4.0);
        assert_eq!(problem.greater.rhs[5], 0.0);
        assert_eq!(problem.objective, vec![830.0, 545.0, 510.0]);
    }

    #[test]
    fn test_problem_shape_with_default_targets() {
        let targets = NutrientTargets::default();
        let products: Vec<Product> = three_products()
            .into_iter()
            .zip([2.0, 0.0, 1.5])
            .map(|(p, iron)| p.with_nutrient(Nutrient::Iron, iron))
            .collect();
        let refs: Vec<&Product> = products.iter().collect();

        let evaluator = DayEvaluator::new(&targets, Solver::new());
        let problem = evaluator.build_problem(&refs);

        assert_eq!(problem.less.len(), 25 + 3);
        assert_eq!(problem.greater.len(), 25 + 3);

        let iron = targets.bounds().iter().position(|b| b.nutrient == Nutrient::Iron).unwrap();
        assert_eq!(problem.less.lhs[iron], vec![2.0, 0.0, 1.5]);
        assert_eq!(problem.less.rhs[iron], 45.0);
        assert_eq!(problem.greater.rhs[iron], 8.0);
        // Product rows follow the nutrient rows
        assert_eq!(problem.less.lhs[25], vec![1.0, 0.0, 0.0]);
        assert_eq!(problem.less.rhs[25], 3.0);

        // No vitamin A anywhere, so its minimum cannot be met
        let outcome = evaluator.evaluate(&refs).unwrap();
        assert_eq!(outcome, DayOutcome::Rejected(Rejection::Infeasible));
    }

    #[test]
    fn test_three_product_day_hits_kcal_band() {
        let targets = kcal_targets();
        let products = three_products();
        let refs: Vec<&Product> = products.iter().collect();

        let outcome = DayEvaluator::new(&targets, Solver::new()).evaluate(&refs).unwrap();
        let day = match outcome {
            DayOutcome::Accepted(day) => day,
            other => panic!("expected an accepted day, got {:?}", other),
        };

        let kcals = day.total(Nutrient::Kcals);
        assert!((3000.0 - 1e-4..=3300.0 + 1e-4).contains(&kcals), "kcals = {}", kcals);
        assert!(day.entries().iter().all(|e| e.amount > 0.0));
    }

    #[test]
    fn test_zero_maximum_is_infeasible() {
        let targets = kcal_targets();
        let products: Vec<Product> = three_products()
            .into_iter()
            .map(|p| {
                let min = p.minimum;
                p.with_bounds(min, 0.0)
            })
            .collect();
        let refs: Vec<&Product> = products.iter().collect();

        let outcome = DayEvaluator::new(&targets, Solver::new()).evaluate(&refs).unwrap();
        assert_eq!(outcome, DayOutcome::Rejected(Rejection::Infeasible));
    }

    #[test]
    fn test_too_little_energy_is_infeasible() {
        let targets = NutrientTargets::new().with(NutrientBound::with_overshoot(Nutrient::Kcals, 5000.0, 0.1));
        let products = three_products();
        let refs: Vec<&Product> = products.iter().collect();

        let outcome = DayEvaluator::new(&targets, Solver::new()).evaluate(&refs).unwrap();
        assert_eq!(outcome, DayOutcome::Rejected(Rejection::Infeasible));
    }

    #[test]
    fn test_unused_products_are_dropped() {
        // Only "a" is needed to reach the band once its cap allows it
        let targets = NutrientTargets::new().with(NutrientBound::new(Nutrient::Kcals, 1000.0, 1500.0));
        let products = vec![
            product(1, "a", [500.0, 0.0, 0.0, 0.0], 3.0),
            product(2, "water", [0.0, 0.0, 0.0, 0.0], 0.0),
        ];
        let refs: Vec<&Product> = products.iter().collect();

        let outcome = DayEvaluator::new(&targets, Solver::new()).evaluate(&refs).unwrap();
        let day = match outcome {
            DayOutcome::Accepted(day) => day,
            other => panic!("expected an accepted day, got {:?}", other),
        };
        assert_eq!(day.len(), 1);
        assert_eq!(day.entries()[0].product.name, "a");
        assert!((day.entries()[0].amount - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_negligible_amounts_are_dropped() {
        // "salt" is pinned to an amount below the validation tolerance
        let targets = NutrientTargets::new().with(NutrientBound::new(Nutrient::Kcals, 1000.0, 1500.0));
        let products = vec![
            product(1, "a", [500.0, 0.0, 0.0, 0.0], 3.0),
            product(2, "salt", [0.0, 0.0, 0.0, 0.0], 5e-5).with_bounds(5e-5, 5e-5),
        ];
        let refs: Vec<&Product> = products.iter().collect();

        let outcome = DayEvaluator::new(&targets, Solver::new()).evaluate(&refs).unwrap();
        let day = match outcome {
            DayOutcome::Accepted(day) => day,
            other => panic!("expected an accepted day, got {:?}", other),
        };
        assert_eq!(day.len(), 1);
        assert_eq!(day.entries()[0].product.name, "a");
        assert!((day.total(Nutrient::Kcals) - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_candidates() {
        let targets = kcal_targets();
        assert_eq!(
            DayEvaluator::new(&targets, Solver::new()).evaluate(&[]).unwrap_err(),
            PlanError::NoCandidates
        );
    }
}
