mod catalog;

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};
use dietplan_planner::{
    DAYS_PER_WEEK, DayPlan, Nutrient, NutrientTargets, PlanConfig, PlanError, Planner, SearchOutcome, SearchStats,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::catalog::{CatalogError, load_catalog, read_diet, read_targets, write_diet, write_product_template};

/// Planned and consumed amounts are stored in 100 g portions
const GRAMS_PER_PORTION: f64 = 100.0;

#[derive(Parser)]
#[command(name = "dietplan")]
#[command(about = "Build randomized weekly diets that meet nutrient targets", long_about = None)]
struct Cli {
    /// Directory searched for product definitions
    #[arg(short, long, global = true, default_value = ".")]
    catalog: PathBuf,
    /// Show search progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an empty product definition with a fresh id
    NewProduct {
        /// Where to write it; `.json` is appended
        path: PathBuf,
    },
    /// Search for a week of meals and write it as a diet file
    Plan(PlanArgs),
    /// List every day's products and grams
    Show { diet: PathBuf },
    /// List the week's total grams per product
    Products { diet: PathBuf },
    /// Show what is left to eat today
    Remaining {
        diet: PathBuf,
        #[command(flatten)]
        day: DayArg,
    },
    /// Record grams of a product eaten today
    Consume {
        diet: PathBuf,
        /// Product name as listed by `show`
        product: String,
        grams: f64,
        #[command(flatten)]
        day: DayArg,
    },
    /// Clear every consumed amount in the diet
    Reset { diet: PathBuf },
    /// Show nutrients consumed today
    Total {
        diet: PathBuf,
        /// Include vitamins and minerals
        #[arg(short, long)]
        detailed: bool,
        #[command(flatten)]
        day: DayArg,
    },
}

#[derive(Args)]
struct PlanArgs {
    /// Diet file to write; `.json` is appended
    output: PathBuf,
    #[arg(long, default_value_t = 8)]
    products_per_day: usize,
    #[arg(long, default_value_t = 15)]
    products_per_week: usize,
    #[arg(long, default_value_t = 8)]
    workers: usize,
    /// Day attempts per weekly pool before it is resampled
    #[arg(long, default_value_t = 7500)]
    max_day_attempts: usize,
    /// Weekly pools each worker may try
    #[arg(long, default_value_t = 1000)]
    max_week_attempts: usize,
    /// Daily energy target
    #[arg(long, default_value_t = 3000.0)]
    kcals: f64,
    /// Allowed excess over each macronutrient target, as a fraction
    #[arg(long, default_value_t = 0.1)]
    overshoot: f64,
    /// Skip the vitamin and mineral ranges
    #[arg(long)]
    macros_only: bool,
    /// JSON file with explicit nutrient ranges; replaces the targets above
    #[arg(long, conflicts_with_all = ["kcals", "overshoot", "macros_only"])]
    targets: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct DayArg {
    /// Day of the week, 1 = Monday (defaults to today)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
    day: Option<u8>,
}

impl DayArg {
    fn index(&self) -> usize {
        match self.day {
            Some(day) => usize::from(day) - 1,
            None => Local::now().weekday().num_days_from_monday() as usize,
        }
    }
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("No products found in {}", .0.display())]
    NoProducts(PathBuf),
    #[error("No day {0} in the diet")]
    NoSuchDay(usize),
    #[error("No product named {0:?} planned for that day")]
    UnknownEntry(String),
    #[error(
        "No diet found after {} weekly pools and {} day attempts",
        .0.week_attempts,
        .0.day_attempts
    )]
    Exhausted(SearchStats),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command, &cli.catalog) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, catalog_dir: &Path) -> Result<(), CliError> {
    match command {
        Commands::NewProduct { path } => {
            let path = write_product_template(&path)?;
            println!("Created {}", path.display());
        }
        Commands::Plan(args) => plan(args, catalog_dir)?,
        Commands::Show { diet } => {
            let plan = read_diet(&diet, &load_catalog(catalog_dir))?;
            for (i, day) in plan.days().iter().enumerate() {
                println!("Day {}:", i + 1);
                for (j, entry) in day.entries().iter().enumerate() {
                    println!("{}) {} - {:.0}", j + 1, entry.product.name, entry.amount * GRAMS_PER_PORTION);
                }
                if i + 1 < DAYS_PER_WEEK {
                    println!();
                }
            }
        }
        Commands::Products { diet } => {
            let plan = read_diet(&diet, &load_catalog(catalog_dir))?;
            for (i, (product, amount)) in plan.product_totals().into_iter().enumerate() {
                println!("{}) {} - {:.0}", i + 1, product.name, amount * GRAMS_PER_PORTION);
            }
        }
        Commands::Remaining { diet, day } => {
            let plan = read_diet(&diet, &load_catalog(catalog_dir))?;
            let index = day.index();
            let today = plan.day(index).ok_or(CliError::NoSuchDay(index + 1))?;
            for (i, entry) in today.entries().iter().enumerate() {
                let done = entry.consumed / entry.amount * 100.0;
                println!(
                    "{}) {} - {:.0}%, {:.0} out of {:.0}",
                    i + 1,
                    entry.product.name,
                    done,
                    entry.remaining() * GRAMS_PER_PORTION,
                    entry.amount * GRAMS_PER_PORTION
                );
            }
        }
        Commands::Consume {
            diet,
            product,
            grams,
            day,
        } => {
            let mut plan = read_diet(&diet, &load_catalog(catalog_dir))?;
            let index = day.index();
            let today = plan.day_mut(index).ok_or(CliError::NoSuchDay(index + 1))?;
            let entry = today
                .entry_mut(&product)
                .ok_or_else(|| CliError::UnknownEntry(product.clone()))?;
            entry.consumed += grams / GRAMS_PER_PORTION;
            info!(product = %product, grams, day = index + 1, "consumed");
            write_diet(&diet, &plan)?;
        }
        Commands::Reset { diet } => {
            let mut plan = read_diet(&diet, &load_catalog(catalog_dir))?;
            plan.reset_consumed();
            write_diet(&diet, &plan)?;
        }
        Commands::Total { diet, detailed, day } => {
            let plan = read_diet(&diet, &load_catalog(catalog_dir))?;
            let index = day.index();
            let today = plan.day(index).ok_or(CliError::NoSuchDay(index + 1))?;
            print_totals(today, &Nutrient::MACROS);
            if detailed {
                println!();
                print_totals(today, &Nutrient::MICROS);
            }
        }
    }
    Ok(())
}

fn plan(args: PlanArgs, catalog_dir: &Path) -> Result<(), CliError> {
    let catalog = load_catalog(catalog_dir);
    if catalog.is_empty() {
        return Err(CliError::NoProducts(catalog_dir.to_path_buf()));
    }

    let targets = match &args.targets {
        Some(path) => read_targets(path)?,
        None if args.macros_only => NutrientTargets::macros(args.kcals, args.overshoot),
        None => NutrientTargets::macros(args.kcals, args.overshoot).with_micronutrients(),
    };

    let mut config = PlanConfig::new(targets)
        .with_week_pool_size(args.products_per_week)
        .with_day_subset_size(args.products_per_day)
        .with_workers(args.workers)
        .with_max_day_attempts(args.max_day_attempts)
        .with_max_week_attempts(args.max_week_attempts);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    info!(products = catalog.len(), workers = config.workers, "searching for a week plan");
    match Planner::new(&catalog, config).run()? {
        SearchOutcome::Found(plan) => {
            let output = args.output.with_extension("json");
            write_diet(&output, &plan)?;
            println!("Diet written to {}", output.display());
            Ok(())
        }
        SearchOutcome::Exhausted(stats) => Err(CliError::Exhausted(stats)),
    }
}

fn print_totals(day: &DayPlan, nutrients: &[Nutrient]) {
    for &nutrient in nutrients {
        println!("{}: {:.2}", nutrient, day.consumed_total(nutrient));
    }
}
