use std::ops::AddAssign;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use dietplan_solver::{BigM, Solver};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::day::{DayEvaluator, DayOutcome};
use crate::error::PlanError;
use crate::plan::{DAYS_PER_WEEK, WeekPlan};
use crate::product::Product;
use crate::sample::pick_random;
use crate::targets::NutrientTargets;

/// Knobs for the weekly plan search
#[derive(Debug, Clone, PartialEq)]
pub struct PlanConfig {
    /// Ranges every day must satisfy
    pub targets: NutrientTargets,
    /// Products drawn from the catalog for one week
    pub week_pool_size: usize,
    /// Products drawn from the weekly pool for one day
    pub day_subset_size: usize,
    /// Day attempts allowed per weekly pool before it is resampled
    pub max_day_attempts: usize,
    /// Weekly pools each worker may try before giving up
    pub max_week_attempts: usize,
    /// Parallel workers; 1 runs on the calling thread
    pub workers: usize,
    /// Seed for reproducible runs; worker `i` uses `seed + i`
    pub seed: Option<u64>,
    /// Slack allowed when re-checking nutrient totals
    pub tolerance: f64,
    pub big_m: BigM,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            targets: NutrientTargets::default(),
            week_pool_size: 15,
            day_subset_size: 8,
            max_day_attempts: 7500,
            max_week_attempts: 1000,
            workers: 8,
            seed: None,
            tolerance: 1e-4,
            big_m: BigM::Auto,
        }
    }
}

impl PlanConfig {
    pub fn new(targets: NutrientTargets) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    pub fn with_week_pool_size(mut self, n: usize) -> Self {
        self.week_pool_size = n;
        self
    }

    pub fn with_day_subset_size(mut self, n: usize) -> Self {
        self.day_subset_size = n;
        self
    }

    pub fn with_max_day_attempts(mut self, n: usize) -> Self {
        self.max_day_attempts = n;
        self
    }

    pub fn with_max_week_attempts(mut self, n: usize) -> Self {
        self.max_week_attempts = n;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = big_m;
        self
    }

    fn validate(&self, catalog_len: usize) -> Result<(), PlanError> {
        self.targets.validate()?;
        if self.workers == 0 {
            return Err(PlanError::InvalidConfig("at least one worker is required".to_string()));
        }
        if self.day_subset_size == 0 {
            return Err(PlanError::InvalidConfig("daily subset size must be positive".to_string()));
        }
        if self.day_subset_size > self.week_pool_size {
            return Err(PlanError::InvalidConfig(format!(
                "daily subset size {} exceeds weekly pool size {}",
                self.day_subset_size, self.week_pool_size
            )));
        }
        if self.week_pool_size > catalog_len {
            return Err(PlanError::NotEnoughCandidates {
                requested: self.week_pool_size,
                available: catalog_len,
            });
        }
        Ok(())
    }
}

/// Attempt counters, summed over workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub week_attempts: usize,
    pub day_attempts: usize,
    pub days_accepted: usize,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, other: Self) {
        self.week_attempts += other.week_attempts;
        self.day_attempts += other.day_attempts;
        self.days_accepted += other.days_accepted;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A complete week satisfying every target
    Found(WeekPlan),
    /// Every worker used up its budget
    Exhausted(SearchStats),
}

enum WorkerOutcome {
    Found(WeekPlan),
    Exhausted,
    /// Another worker finished first
    Cancelled,
}

struct WorkerReport {
    id: usize,
    outcome: Result<WorkerOutcome, PlanError>,
    stats: SearchStats,
}

/// Randomized search for a week plan over a fixed product catalog.
pub struct Planner<'a> {
    catalog: &'a [Product],
    config: PlanConfig,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a [Product], config: PlanConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn run(&self) -> Result<SearchOutcome, PlanError> {
        if self.catalog.is_empty() {
            return Err(PlanError::NoCandidates);
        }
        self.config.validate(self.catalog.len())?;

        if self.config.workers == 1 {
            let done = AtomicBool::new(false);
            let report = self.run_worker(0, &done);
            return match report.outcome? {
                WorkerOutcome::Found(plan) => Ok(SearchOutcome::Found(plan)),
                WorkerOutcome::Exhausted | WorkerOutcome::Cancelled => Ok(SearchOutcome::Exhausted(report.stats)),
            };
        }

        self.race()
    }

    /// Runs every worker on its own thread and keeps the first plan reported.
    fn race(&self) -> Result<SearchOutcome, PlanError> {
        let done = AtomicBool::new(false);
        let (report_snd, report_rcv) = crossbeam_channel::unbounded();

        thread::scope(|scope| {
            for id in 0..self.config.workers {
                let report_snd = report_snd.clone();
                let done = &done;
                scope.spawn(move || {
                    let report = self.run_worker(id, done);
                    // the receiver outlives every worker inside the scope
                    let _ = report_snd.send(report);
                });
            }
            drop(report_snd);

            let mut winner = None;
            let mut failure = None;
            let mut stats = SearchStats::default();

            // Ends once every worker has reported and dropped its sender
            for report in report_rcv.iter() {
                stats += report.stats;
                match report.outcome {
                    Ok(WorkerOutcome::Found(plan)) if winner.is_none() => {
                        info!(worker = report.id, stats = ?report.stats, "week plan found");
                        done.store(true, Ordering::Release);
                        winner = Some(plan);
                    }
                    Ok(WorkerOutcome::Found(_)) => debug!(worker = report.id, "late plan discarded"),
                    Ok(WorkerOutcome::Exhausted) => debug!(worker = report.id, "worker exhausted its budget"),
                    Ok(WorkerOutcome::Cancelled) => trace!(worker = report.id, "worker cancelled"),
                    Err(e) => {
                        done.store(true, Ordering::Release);
                        failure.get_or_insert(e);
                    }
                }
            }

            match (failure, winner) {
                (Some(e), _) => Err(e),
                (None, Some(plan)) => Ok(SearchOutcome::Found(plan)),
                (None, None) => {
                    info!(?stats, "search exhausted");
                    Ok(SearchOutcome::Exhausted(stats))
                }
            }
        })
    }

    fn run_worker(&self, id: usize, done: &AtomicBool) -> WorkerReport {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let mut stats = SearchStats::default();
        let outcome = self.search(id, &mut rng, done, &mut stats);
        WorkerReport { id, outcome, stats }
    }

    /// One worker's loop: sample a weekly pool, fill seven days from it, and
    /// start over with a fresh pool when the day budget runs out.
    fn search<R: Rng>(
        &self,
        worker: usize,
        rng: &mut R,
        done: &AtomicBool,
        stats: &mut SearchStats,
    ) -> Result<WorkerOutcome, PlanError> {
        let solver = Solver::new().with_big_m(self.config.big_m);
        let evaluator = DayEvaluator::new(&self.config.targets, solver).with_tolerance(self.config.tolerance);

        'weeks: for week in 0..self.config.max_week_attempts {
            if done.load(Ordering::Acquire) {
                return Ok(WorkerOutcome::Cancelled);
            }
            stats.week_attempts += 1;

            let pool = pick_random(rng, self.catalog, self.config.week_pool_size)?;
            let mut days = Vec::with_capacity(DAYS_PER_WEEK);
            let mut attempts = 0;

            while days.len() < DAYS_PER_WEEK {
                if done.load(Ordering::Acquire) {
                    return Ok(WorkerOutcome::Cancelled);
                }
                if attempts >= self.config.max_day_attempts {
                    debug!(worker, week, days = days.len(), "weekly pool abandoned");
                    continue 'weeks;
                }
                attempts += 1;
                stats.day_attempts += 1;

                let subset: Vec<&Product> = pick_random(rng, &pool, self.config.day_subset_size)?
                    .into_iter()
                    .copied()
                    .collect();
                match evaluator.evaluate(&subset)? {
                    DayOutcome::Accepted(day) => {
                        stats.days_accepted += 1;
                        days.push(day);
                    }
                    DayOutcome::Rejected(reason) => trace!(worker, %reason, "day rejected"),
                }
            }

            return Ok(WorkerOutcome::Found(WeekPlan::new(days)?));
        }

        Ok(WorkerOutcome::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrient::Nutrient;
    use crate::targets::NutrientBound;

    fn kcal_targets() -> NutrientTargets {
        NutrientTargets::new().with(NutrientBound::with_overshoot(Nutrient::Kcals, 3000.0, 0.1))
    }

    /// Any three of these reach the energy band.
    fn easy_catalog(n: u64) -> Vec<Product> {
        (0..n)
            .map(|i| {
                Product::new(i, format!("p{}", i))
                    .with_nutrient(Nutrient::Kcals, 400.0 + 10.0 * i as f64)
                    .with_nutrient(Nutrient::Proteins, 10.0)
                    .with_bounds(0.0, 3.0)
            })
            .collect()
    }

    fn assert_valid(plan: &WeekPlan, targets: &NutrientTargets) {
        assert_eq!(plan.days().len(), DAYS_PER_WEEK);
        for day in plan.days() {
            assert!(!day.is_empty());
            for bound in targets.bounds() {
                let total = day.total(bound.nutrient);
                assert!(bound.contains(total, 1e-4), "{} = {}", bound.nutrient, total);
            }
        }
    }

    #[test]
    fn test_sequential_search_finds_plan() {
        let catalog = easy_catalog(20);
        let config = PlanConfig::new(kcal_targets())
            .with_week_pool_size(10)
            .with_day_subset_size(4)
            .with_workers(1)
            .with_seed(11);

        let outcome = Planner::new(&catalog, config.clone()).run().unwrap();
        let plan = match outcome {
            SearchOutcome::Found(plan) => plan,
            other => panic!("expected a plan, got {:?}", other),
        };
        assert_valid(&plan, &config.targets);

        // Same seed, same plan
        let again = Planner::new(&catalog, config).run().unwrap();
        assert_eq!(again, SearchOutcome::Found(plan));
    }

    #[test]
    fn test_parallel_search_finds_plan() {
        let catalog = easy_catalog(30);
        let config = PlanConfig::new(kcal_targets())
            .with_week_pool_size(12)
            .with_day_subset_size(5)
            .with_workers(4)
            .with_seed(5);

        let outcome = Planner::new(&catalog, config.clone()).run().unwrap();
        let plan = match outcome {
            SearchOutcome::Found(plan) => plan,
            other => panic!("expected a plan, got {:?}", other),
        };
        assert_valid(&plan, &config.targets);
    }

    #[test]
    fn test_unsatisfiable_catalog_exhausts() {
        let catalog: Vec<Product> = easy_catalog(6).into_iter().map(|p| p.with_bounds(0.0, 0.0)).collect();
        let config = PlanConfig::new(kcal_targets())
            .with_week_pool_size(4)
            .with_day_subset_size(2)
            .with_max_day_attempts(5)
            .with_max_week_attempts(3)
            .with_workers(1)
            .with_seed(1);

        let outcome = Planner::new(&catalog, config.clone()).run().unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Exhausted(SearchStats {
                week_attempts: 3,
                day_attempts: 15,
                days_accepted: 0,
            })
        );

        let outcome = Planner::new(&catalog, config.with_workers(3)).run().unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Exhausted(SearchStats {
                week_attempts: 9,
                day_attempts: 45,
                days_accepted: 0,
            })
        );
    }

    #[test]
    fn test_empty_catalog() {
        let err = Planner::new(&[], PlanConfig::default()).run().unwrap_err();
        assert_eq!(err, PlanError::NoCandidates);
    }

    #[test]
    fn test_invalid_configuration() {
        let catalog = easy_catalog(5);

        let err = Planner::new(&catalog, PlanConfig::new(kcal_targets())).run().unwrap_err();
        assert_eq!(err, PlanError::NotEnoughCandidates { requested: 15, available: 5 });

        let config = PlanConfig::new(kcal_targets()).with_week_pool_size(3).with_day_subset_size(4);
        assert!(matches!(
            Planner::new(&catalog, config).run(),
            Err(PlanError::InvalidConfig(_))
        ));

        let config = PlanConfig::new(kcal_targets()).with_week_pool_size(3).with_day_subset_size(2).with_workers(0);
        assert!(matches!(
            Planner::new(&catalog, config).run(),
            Err(PlanError::InvalidConfig(_))
        ));
    }
}
