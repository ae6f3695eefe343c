use std::fmt;

use serde::{Deserialize, Serialize};

/// Nutrients a product can carry, keyed by the field names used in product files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    Kcals,
    Proteins,
    Carbs,
    Fats,

    VitaminA,
    Thiamin,
    Riboflavin,
    Niacin,
    PantothenicAcid,
    VitaminB6,
    Folate,
    VitaminB12,
    VitaminC,
    VitaminD,
    VitaminE,
    VitaminK,

    Calcium,
    Magnesium,
    Phosphorus,
    Potassium,
    Sodium,
    Copper,
    Iron,
    Manganese,
    Zinc,

    Omega3,
    Omega6,
}

impl Nutrient {
    /// Energy and the three energy-bearing macronutrients
    pub const MACROS: [Nutrient; 4] = [Nutrient::Kcals, Nutrient::Proteins, Nutrient::Carbs, Nutrient::Fats];

    /// Vitamins and minerals with daily reference intakes
    pub const MICROS: [Nutrient; 21] = [
        Nutrient::VitaminA,
        Nutrient::Thiamin,
        Nutrient::Riboflavin,
        Nutrient::Niacin,
        Nutrient::PantothenicAcid,
        Nutrient::VitaminB6,
        Nutrient::Folate,
        Nutrient::VitaminB12,
        Nutrient::VitaminC,
        Nutrient::VitaminD,
        Nutrient::VitaminE,
        Nutrient::VitaminK,
        Nutrient::Calcium,
        Nutrient::Magnesium,
        Nutrient::Phosphorus,
        Nutrient::Potassium,
        Nutrient::Sodium,
        Nutrient::Copper,
        Nutrient::Iron,
        Nutrient::Manganese,
        Nutrient::Zinc,
    ];

    /// Multiplier turning a product amount into intake.
    ///
    /// Macronutrient intake is counted in kcal so that protein, carb and fat
    /// targets can be expressed as shares of the energy target.
    pub fn intake_factor(self) -> f64 {
        match self {
            Nutrient::Proteins | Nutrient::Carbs => 4.0,
            Nutrient::Fats => 9.0,
            _ => 1.0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Nutrient::Kcals => "Kcals",
            Nutrient::Proteins => "Proteins",
            Nutrient::Carbs => "Carbs",
            Nutrient::Fats => "Fats",
            Nutrient::VitaminA => "Vitamin A",
            Nutrient::Thiamin => "Thiamin",
            Nutrient::Riboflavin => "Riboflavin",
            Nutrient::Niacin => "Niacin",
            Nutrient::PantothenicAcid => "Pantothenic Acid",
            Nutrient::VitaminB6 => "Vitamin B6",
            Nutrient::Folate => "Folate",
            Nutrient::VitaminB12 => "Vitamin B12",
            Nutrient::VitaminC => "Vitamin C",
            Nutrient::VitaminD => "Vitamin D",
            Nutrient::VitaminE => "Vitamin E",
            Nutrient::VitaminK => "Vitamin K",
            Nutrient::Calcium => "Calcium",
            Nutrient::Magnesium => "Magnesium",
            Nutrient::Phosphorus => "Phosphorus",
            Nutrient::Potassium => "Potassium",
            Nutrient::Sodium => "Sodium",
            Nutrient::Copper => "Copper",
            Nutrient::Iron => "Iron",
            Nutrient::Manganese => "Manganese",
            Nutrient::Zinc => "Zinc",
            Nutrient::Omega3 => "Omega-3",
            Nutrient::Omega6 => "Omega-6",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
