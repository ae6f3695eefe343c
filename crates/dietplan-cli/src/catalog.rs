use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dietplan_planner::{EntryRecord, NutrientTargets, PlanError, Product, WeekPlan};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

const JSON_EXTENSION: &str = "json";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Error reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Error writing {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("Not a JSON file: {}", .0.display())]
    NotJson(PathBuf),
    #[error("File already exists: {}", .0.display())]
    Exists(PathBuf),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == JSON_EXTENSION)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let source = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), CatalogError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads one product definition; its name is the file stem.
pub fn read_product(path: &Path) -> Result<Product, CatalogError> {
    product_from_value(path, read_json(path)?)
}

fn product_from_value(path: &Path, value: serde_json::Value) -> Result<Product, CatalogError> {
    let mut product: Product = serde_json::from_value(value).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    product.name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(product)
}

/// Collects every product definition under `dir`.
///
/// JSON documents that are not objects (diet and target files) are skipped
/// quietly. Objects that fail to parse as products are skipped with a warning.
pub fn load_catalog(dir: &Path) -> Vec<Product> {
    let mut products = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable catalog entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_json(entry.path()) {
            continue;
        }

        let path = entry.path();
        let value: serde_json::Value = match read_json(path) {
            Ok(value) => value,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if !value.is_object() {
            debug!(path = %path.display(), "skipping non-product JSON");
            continue;
        }
        match product_from_value(path, value) {
            Ok(product) => products.push(product),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }

    debug!(count = products.len(), dir = %dir.display(), "catalog loaded");
    products
}

/// Writes a zeroed product definition with a fresh random id.
///
/// The `.json` extension is forced onto `path`; returns the path written.
pub fn write_product_template(path: &Path) -> Result<PathBuf, CatalogError> {
    let path = path.with_extension(JSON_EXTENSION);
    if path.exists() {
        return Err(CatalogError::Exists(path));
    }
    let product = Product::new(rand::random(), String::new());
    write_json(&product, &path)?;
    Ok(path)
}

/// Reads nutrient ranges stored as `[{"Nutrient": .., "Minimum": .., "Maximum": ..}]`.
pub fn read_targets(path: &Path) -> Result<NutrientTargets, CatalogError> {
    let targets: NutrientTargets = read_json(path)?;
    targets.validate()?;
    Ok(targets)
}

pub fn read_diet(path: &Path, catalog: &[Product]) -> Result<WeekPlan, CatalogError> {
    if !is_json(path) {
        return Err(CatalogError::NotJson(path.to_path_buf()));
    }
    let records: Vec<Vec<EntryRecord>> = read_json(path)?;
    Ok(WeekPlan::from_records(records, catalog)?)
}

pub fn write_diet(path: &Path, plan: &WeekPlan) -> Result<(), CatalogError> {
    write_json(&plan.to_records(), path)
}
