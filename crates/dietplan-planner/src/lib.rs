mod day;
mod error;
mod nutrient;
mod plan;
mod product;
mod sample;
mod search;
mod targets;

pub use day::{DayEvaluator, DayOutcome, Rejection};
pub use error::PlanError;
pub use nutrient::Nutrient;
pub use plan::{DAYS_PER_WEEK, DayPlan, DietEntry, EntryRecord, WeekPlan};
pub use product::Product;
pub use sample::pick_random;
pub use search::{PlanConfig, Planner, SearchOutcome, SearchStats};
pub use targets::{NutrientBound, NutrientTargets};
