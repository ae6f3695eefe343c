use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::nutrient::Nutrient;

/// Share of the energy target covered by each macronutrient
const PROTEIN_SHARE: f64 = 0.15;
const CARB_SHARE: f64 = 0.55;
const FAT_SHARE: f64 = 0.30;

/// Daily reference intakes as `(nutrient, minimum, maximum)`.
///
/// Nutrients without an established upper intake use `minimum * 10000`.
const MICRONUTRIENT_RANGES: [(Nutrient, f64, f64); 21] = [
    (Nutrient::VitaminA, 3000.0, 7000.0),
    (Nutrient::Thiamin, 1.2, 1.2 * 10000.0),
    (Nutrient::Riboflavin, 1.3, 1.3 * 10000.0),
    (Nutrient::Niacin, 16.0, 35.0),
    (Nutrient::PantothenicAcid, 5.0, 5.0 * 10000.0),
    (Nutrient::VitaminB6, 1.3, 100.0),
    (Nutrient::Folate, 400.0, 800.0),
    (Nutrient::VitaminB12, 2.4, 600.0),
    (Nutrient::VitaminC, 90.0, 1500.0),
    (Nutrient::VitaminD, 150.0, 4000.0),
    (Nutrient::VitaminE, 5.0, 125.0),
    (Nutrient::VitaminK, 120.0, 120.0 * 10000.0),
    (Nutrient::Calcium, 1000.0, 2500.0),
    (Nutrient::Magnesium, 420.0, 420.0 * 10000.0),
    (Nutrient::Phosphorus, 700.0, 4000.0),
    (Nutrient::Potassium, 4700.0, 4700.0 * 10000.0),
    (Nutrient::Sodium, 1500.0, 2300.0),
    (Nutrient::Copper, 0.9, 10.0),
    (Nutrient::Iron, 8.0, 45.0),
    (Nutrient::Manganese, 2.3, 10.0),
    (Nutrient::Zinc, 11.0, 40.0),
];

/// Acceptable daily intake range for one nutrient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NutrientBound {
    pub nutrient: Nutrient,
    pub minimum: f64,
    pub maximum: f64,
}

impl NutrientBound {
    pub fn new(nutrient: Nutrient, minimum: f64, maximum: f64) -> Self {
        Self {
            nutrient,
            minimum,
            maximum,
        }
    }

    /// `[target, target * (1 + overshoot)]`
    pub fn with_overshoot(nutrient: Nutrient, target: f64, overshoot: f64) -> Self {
        Self::new(nutrient, target, target + target * overshoot)
    }

    /// Whether `total` lies in the range widened by `tolerance` on both sides.
    pub fn contains(&self, total: f64, tolerance: f64) -> bool {
        total >= self.minimum - tolerance && total <= self.maximum + tolerance
    }
}

/// The set of nutrient ranges a day plan must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientTargets {
    bounds: Vec<NutrientBound>,
}

impl NutrientTargets {
    pub fn new() -> Self {
        Self { bounds: Vec::new() }
    }

    /// Energy target plus protein, carb and fat targets derived from it.
    pub fn macros(kcals: f64, overshoot: f64) -> Self {
        Self::new()
            .with(NutrientBound::with_overshoot(Nutrient::Kcals, kcals, overshoot))
            .with(NutrientBound::with_overshoot(Nutrient::Proteins, kcals * PROTEIN_SHARE, overshoot))
            .with(NutrientBound::with_overshoot(Nutrient::Carbs, kcals * CARB_SHARE, overshoot))
            .with(NutrientBound::with_overshoot(Nutrient::Fats, kcals * FAT_SHARE, overshoot))
    }

    /// Adds the reference vitamin and mineral ranges.
    pub fn with_micronutrients(self) -> Self {
        MICRONUTRIENT_RANGES
            .iter()
            .fold(self, |targets, &(nutrient, min, max)| {
                targets.with(NutrientBound::new(nutrient, min, max))
            })
    }

    /// Adds a bound, replacing any existing bound on the same nutrient.
    pub fn with(mut self, bound: NutrientBound) -> Self {
        match self.bounds.iter_mut().find(|b| b.nutrient == bound.nutrient) {
            Some(existing) => *existing = bound,
            None => self.bounds.push(bound),
        }
        self
    }

    pub fn bounds(&self) -> &[NutrientBound] {
        &self.bounds
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<&NutrientBound> {
        self.bounds.iter().find(|b| b.nutrient == nutrient)
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.bounds.is_empty() {
            return Err(PlanError::InvalidConfig("no nutrient targets".to_string()));
        }
        for bound in &self.bounds {
            if !bound.minimum.is_finite() || !bound.maximum.is_finite() || bound.minimum > bound.maximum {
                return Err(PlanError::InvalidBound(*bound));
            }
        }
        Ok(())
    }
}

impl Default for NutrientTargets {
    fn default() -> Self {
        Self::macros(3000.0, 0.1).with_micronutrients()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_targets() {
        let targets = NutrientTargets::macros(3000.0, 0.1);
        assert_eq!(targets.len(), 4);

        let kcals = targets.get(Nutrient::Kcals).unwrap();
        assert_eq!(kcals.minimum, 3000.0);
        assert!((kcals.maximum - 3300.0).abs() < 1e-9);

        let proteins = targets.get(Nutrient::Proteins).unwrap();
        assert!((proteins.minimum - 450.0).abs() < 1e-9);
        assert!((proteins.maximum - 495.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_tracks_micronutrients() {
        let targets = NutrientTargets::default();
        assert_eq!(targets.len(), 25);
        assert_eq!(targets.get(Nutrient::Sodium), Some(&NutrientBound::new(Nutrient::Sodium, 1500.0, 2300.0)));
        assert!(targets.get(Nutrient::Omega3).is_none());
        assert!(targets.validate().is_ok());
    }

    #[test]
    fn test_with_replaces_existing_bound() {
        let targets = NutrientTargets::macros(2000.0, 0.05).with(NutrientBound::new(Nutrient::Kcals, 1800.0, 1900.0));
        assert_eq!(targets.len(), 4);
        assert_eq!(targets.bounds()[0], NutrientBound::new(Nutrient::Kcals, 1800.0, 1900.0));
    }

    #[test]
    fn test_contains_uses_tolerance() {
        let bound = NutrientBound::with_overshoot(Nutrient::Kcals, 3000.0, 0.1);
        assert!(bound.contains(3000.0, 0.0));
        assert!(bound.contains(2999.99995, 1e-4));
        assert!(!bound.contains(2999.0, 1e-4));
        assert!(!bound.contains(3301.0, 1e-4));
    }

    #[test]
    fn test_validate_rejects_inverted_bound() {
        let targets = NutrientTargets::new().with(NutrientBound::new(Nutrient::Iron, 10.0, 5.0));
        assert!(matches!(targets.validate(), Err(PlanError::InvalidBound(_))));
        assert!(matches!(NutrientTargets::new().validate(), Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_targets_from_json() {
        let json = r#"[
            { "Nutrient": "Kcals", "Minimum": 2500, "Maximum": 2700 },
            { "Nutrient": "VitaminC", "Minimum": 90, "Maximum": 1500 }
        ]"#;
        let targets: NutrientTargets = serde_json::from_str(json).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.get(Nutrient::VitaminC).unwrap().maximum, 1500.0);
    }
}
