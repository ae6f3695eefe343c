use serde::{Deserialize, Serialize};

use crate::nutrient::Nutrient;

/// A food with its nutrient profile per 100 units and its daily quantity bounds.
///
/// Quantities (`minimum`, `maximum` and planned amounts) are multiples of the
/// 100-unit basis, so an amount of 1.5 means 150 g of a per-100 g profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default, deny_unknown_fields)]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: u64,

    pub maximum: f64,
    pub minimum: f64,

    pub description: String,

    pub kcals: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,

    pub vitamin_a: f64,
    pub thiamin: f64,
    pub riboflavin: f64,
    pub niacin: f64,
    pub pantothenic_acid: f64,
    pub vitamin_b6: f64,
    pub folate: f64,
    pub vitamin_b12: f64,
    pub vitamin_c: f64,
    pub vitamin_d: f64,
    pub vitamin_e: f64,
    pub vitamin_k: f64,

    pub calcium: f64,
    pub magnesium: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub sodium: f64,
    pub copper: f64,
    pub iron: f64,
    pub manganese: f64,
    pub zinc: f64,

    pub omega3: f64,
    pub omega6: f64,

    /// Display name, taken from the definition's file name
    #[serde(skip)]
    pub name: String,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn with_nutrient(mut self, nutrient: Nutrient, amount: f64) -> Self {
        *self.amount_mut(nutrient) = amount;
        self
    }

    /// Amount of `nutrient` per 100 units
    pub fn amount(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Kcals => self.kcals,
            Nutrient::Proteins => self.proteins,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fats => self.fats,
            Nutrient::VitaminA => self.vitamin_a,
            Nutrient::Thiamin => self.thiamin,
            Nutrient::Riboflavin => self.riboflavin,
            Nutrient::Niacin => self.niacin,
            Nutrient::PantothenicAcid => self.pantothenic_acid,
            Nutrient::VitaminB6 => self.vitamin_b6,
            Nutrient::Folate => self.folate,
            Nutrient::VitaminB12 => self.vitamin_b12,
            Nutrient::VitaminC => self.vitamin_c,
            Nutrient::VitaminD => self.vitamin_d,
            Nutrient::VitaminE => self.vitamin_e,
            Nutrient::VitaminK => self.vitamin_k,
            Nutrient::Calcium => self.calcium,
            Nutrient::Magnesium => self.magnesium,
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
            Nutrient::Sodium => self.sodium,
            Nutrient::Copper => self.copper,
            Nutrient::Iron => self.iron,
            Nutrient::Manganese => self.manganese,
            Nutrient::Zinc => self.zinc,
            Nutrient::Omega3 => self.omega3,
            Nutrient::Omega6 => self.omega6,
        }
    }

    fn amount_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        match nutrient {
            Nutrient::Kcals => &mut self.kcals,
            Nutrient::Proteins => &mut self.proteins,
            Nutrient::Carbs => &mut self.carbs,
            Nutrient::Fats => &mut self.fats,
            Nutrient::VitaminA => &mut self.vitamin_a,
            Nutrient::Thiamin => &mut self.thiamin,
            Nutrient::Riboflavin => &mut self.riboflavin,
            Nutrient::Niacin => &mut self.niacin,
            Nutrient::PantothenicAcid => &mut self.pantothenic_acid,
            Nutrient::VitaminB6 => &mut self.vitamin_b6,
            Nutrient::Folate => &mut self.folate,
            Nutrient::VitaminB12 => &mut self.vitamin_b12,
            Nutrient::VitaminC => &mut self.vitamin_c,
            Nutrient::VitaminD => &mut self.vitamin_d,
            Nutrient::VitaminE => &mut self.vitamin_e,
            Nutrient::VitaminK => &mut self.vitamin_k,
            Nutrient::Calcium => &mut self.calcium,
            Nutrient::Magnesium => &mut self.magnesium,
            Nutrient::Phosphorus => &mut self.phosphorus,
            Nutrient::Potassium => &mut self.potassium,
            Nutrient::Sodium => &mut self.sodium,
            Nutrient::Copper => &mut self.copper,
            Nutrient::Iron => &mut self.iron,
            Nutrient::Manganese => &mut self.manganese,
            Nutrient::Zinc => &mut self.zinc,
            Nutrient::Omega3 => &mut self.omega3,
            Nutrient::Omega6 => &mut self.omega6,
        }
    }

    /// Intake of `nutrient` contributed by one 100-unit portion
    pub fn intake(&self, nutrient: Nutrient) -> f64 {
        self.amount(nutrient) * nutrient.intake_factor()
    }

    /// Energy of one portion counting every macronutrient, used as the
    /// planning objective.
    pub fn energy_score(&self) -> f64 {
        Nutrient::MACROS.iter().map(|&n| self.intake(n)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_definition() {
        let json = r#"{
            "ID": 42,
            "Maximum": 3,
            "Minimum": 0.5,
            "Description": "Oats",
            "Kcals": 389,
            "Proteins": 16.9,
            "Carbs": 66.3,
            "Fats": 6.9,
            "VitaminB6": 0.12,
            "Omega3": 0.1
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 42);
        assert_eq!(product.maximum, 3.0);
        assert_eq!(product.minimum, 0.5);
        assert_eq!(product.amount(Nutrient::Kcals), 389.0);
        assert_eq!(product.amount(Nutrient::VitaminB6), 0.12);
        assert_eq!(product.amount(Nutrient::Zinc), 0.0);
        assert!(product.name.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{ "ID": 1, "Sugar": 10 }"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_intake_counts_macros_in_kcal() {
        let product = Product::new(1, "mix")
            .with_nutrient(Nutrient::Kcals, 500.0)
            .with_nutrient(Nutrient::Proteins, 10.0)
            .with_nutrient(Nutrient::Carbs, 50.0)
            .with_nutrient(Nutrient::Fats, 10.0)
            .with_nutrient(Nutrient::Iron, 2.0);

        assert_eq!(product.intake(Nutrient::Proteins), 40.0);
        assert_eq!(product.intake(Nutrient::Carbs), 200.0);
        assert_eq!(product.intake(Nutrient::Fats), 90.0);
        assert_eq!(product.intake(Nutrient::Iron), 2.0);
        assert_eq!(product.energy_score(), 830.0);
    }
}
