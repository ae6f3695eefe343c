use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::nutrient::Nutrient;
use crate::product::Product;

pub const DAYS_PER_WEEK: usize = 7;

/// A product scheduled for one day, with how much of it was eaten so far.
#[derive(Debug, Clone, PartialEq)]
pub struct DietEntry {
    pub product: Product,
    /// Planned quantity in 100-unit portions
    pub amount: f64,
    /// Consumed quantity in 100-unit portions
    pub consumed: f64,
}

impl DietEntry {
    pub fn new(product: Product, amount: f64) -> Self {
        Self {
            product,
            amount,
            consumed: 0.0,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.amount - self.consumed
    }

    pub fn intake(&self, nutrient: Nutrient) -> f64 {
        self.product.intake(nutrient) * self.amount
    }

    pub fn consumed_intake(&self, nutrient: Nutrient) -> f64 {
        self.product.intake(nutrient) * self.consumed
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayPlan {
    entries: Vec<DietEntry>,
}

impl DayPlan {
    pub fn new(entries: Vec<DietEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DietEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Planned intake of `nutrient` over the whole day
    pub fn total(&self, nutrient: Nutrient) -> f64 {
        self.entries.iter().map(|e| e.intake(nutrient)).sum()
    }

    /// Intake of `nutrient` consumed so far
    pub fn consumed_total(&self, nutrient: Nutrient) -> f64 {
        self.entries.iter().map(|e| e.consumed_intake(nutrient)).sum()
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut DietEntry> {
        self.entries.iter_mut().find(|e| e.product.name == name)
    }
}

/// Seven day plans, Monday first.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan {
    days: Vec<DayPlan>,
}

impl WeekPlan {
    pub fn new(days: Vec<DayPlan>) -> Result<Self, PlanError> {
        if days.len() != DAYS_PER_WEEK {
            return Err(PlanError::DayCount {
                expected: DAYS_PER_WEEK,
                found: days.len(),
            });
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Option<&DayPlan> {
        self.days.get(index)
    }

    pub fn day_mut(&mut self, index: usize) -> Option<&mut DayPlan> {
        self.days.get_mut(index)
    }

    pub fn reset_consumed(&mut self) {
        for entry in self.days.iter_mut().flat_map(|d| d.entries.iter_mut()) {
            entry.consumed = 0.0;
        }
    }

    /// Planned quantity of each product over the week, in first-seen order.
    pub fn product_totals(&self) -> Vec<(&Product, f64)> {
        let mut totals: Vec<(&Product, f64)> = Vec::new();
        for entry in self.days.iter().flat_map(|d| d.entries()) {
            match totals.iter_mut().find(|(p, _)| p.id == entry.product.id) {
                Some((_, amount)) => *amount += entry.amount,
                None => totals.push((&entry.product, entry.amount)),
            }
        }
        totals
    }

    pub fn to_records(&self) -> Vec<Vec<EntryRecord>> {
        self.days
            .iter()
            .map(|day| {
                day.entries()
                    .iter()
                    .map(|e| EntryRecord {
                        id: e.product.id,
                        amount: e.amount,
                        consumed: e.consumed,
                    })
                    .collect()
            })
            .collect()
    }

    /// Rebuilds a plan from stored records, resolving products by id.
    pub fn from_records(records: Vec<Vec<EntryRecord>>, catalog: &[Product]) -> Result<Self, PlanError> {
        let days = records
            .into_iter()
            .map(|day| {
                day.into_iter()
                    .map(|record| {
                        let product = catalog
                            .iter()
                            .find(|p| p.id == record.id)
                            .ok_or(PlanError::UnknownProduct(record.id))?;
                        Ok(DietEntry {
                            product: product.clone(),
                            amount: record.amount,
                            consumed: record.consumed,
                        })
                    })
                    .collect::<Result<Vec<_>, PlanError>>()
                    .map(DayPlan::new)
            })
            .collect::<Result<Vec<_>, PlanError>>()?;
        Self::new(days)
    }
}

/// Stored form of a [`DietEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EntryRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    pub amount: f64,
    #[serde(default)]
    pub consumed: f64,
}
