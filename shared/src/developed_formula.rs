//! Developed formula: the diet table built food by food
//!
//! Rows are summed column-wise; the totals are then turned into the energy
//! actually supplied by the diet and the share of it coming from saturated
//! fat, simple carbohydrate and high-biologic-value protein. An empty table
//! is a normal state and yields zeros everywhere.

use crate::distribution::{distribute, MacroDistribution, MacroPercent, CARB_KCAL_PER_G, FAT_KCAL_PER_G, PROTEIN_KCAL_PER_G};
use crate::errors::EngineResult;
use crate::locale::{deserialize_cell, deserialize_optional_decimal};
use crate::validation::{optional_positive, ratio_or_zero};
use serde::{Deserialize, Serialize};

/// Saturated-fat ceiling as a share of the energy target
pub const SATURATED_FAT_TARGET_SHARE: f64 = 0.07;
/// Simple-carbohydrate ceiling as a share of the energy target
pub const SIMPLE_CARB_TARGET_SHARE: f64 = 0.20;

/// Nutrient columns shared by a food row and the column totals
///
/// Cells may be sent as numbers or typed text; blank or unreadable cells
/// count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientColumns {
    #[serde(deserialize_with = "deserialize_cell")]
    pub carbohydrate_g: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub protein_g: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub high_biologic_value_protein_g: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub fat_g: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub sodium_mg: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub potassium_mg: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub phosphorus_mg: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub calcium_mg: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub cholesterol_mg: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub purines_mg: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub water_ml: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub saturated_fat_g: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub simple_carbohydrate_g: f64,
    #[serde(deserialize_with = "deserialize_cell")]
    pub fiber_g: f64,
}

impl NutrientColumns {
    fn add(&mut self, other: &NutrientColumns) {
        fn cell(v: f64) -> f64 {
            if v.is_finite() {
                v
            } else {
                0.0
            }
        }

        self.carbohydrate_g += cell(other.carbohydrate_g);
        self.protein_g += cell(other.protein_g);
        self.high_biologic_value_protein_g += cell(other.high_biologic_value_protein_g);
        self.fat_g += cell(other.fat_g);
        self.sodium_mg += cell(other.sodium_mg);
        self.potassium_mg += cell(other.potassium_mg);
        self.phosphorus_mg += cell(other.phosphorus_mg);
        self.calcium_mg += cell(other.calcium_mg);
        self.cholesterol_mg += cell(other.cholesterol_mg);
        self.purines_mg += cell(other.purines_mg);
        self.water_ml += cell(other.water_ml);
        self.saturated_fat_g += cell(other.saturated_fat_g);
        self.simple_carbohydrate_g += cell(other.simple_carbohydrate_g);
        self.fiber_g += cell(other.fiber_g);
    }
}

/// One food in the diet table
///
/// `quantity` is in the food's own unit (g, ml, pieces) and is not totalled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopedFormulaRow {
    #[serde(default)]
    pub food: String,
    #[serde(default)]
    pub household_serving: String,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub quantity: f64,
    #[serde(flatten)]
    pub nutrients: NutrientColumns,
}

/// Energy of the summed macronutrient columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KcalRow {
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub simple_carbohydrate: f64,
}

/// Column totals and the percentages derived from them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopedFormulaTotals {
    pub row_count: usize,
    pub sums: NutrientColumns,
    pub kcal: KcalRow,
    pub real_energy_kcal: f64,
    pub saturated_fat_percent: f64,
    pub simple_carbohydrate_percent: f64,
    pub high_biologic_value_protein_percent: f64,
}

/// Sum the table and derive the real diet contribution
pub fn aggregate(rows: &[DevelopedFormulaRow]) -> DevelopedFormulaTotals {
    let mut sums = NutrientColumns::default();
    for row in rows {
        sums.add(&row.nutrients);
    }

    let kcal = KcalRow {
        carbohydrate: sums.carbohydrate_g * CARB_KCAL_PER_G,
        protein: sums.protein_g * PROTEIN_KCAL_PER_G,
        fat: sums.fat_g * FAT_KCAL_PER_G,
        saturated_fat: sums.saturated_fat_g * FAT_KCAL_PER_G,
        simple_carbohydrate: sums.simple_carbohydrate_g * CARB_KCAL_PER_G,
    };
    let real_energy_kcal = kcal.carbohydrate + kcal.protein + kcal.fat;

    DevelopedFormulaTotals {
        row_count: rows.len(),
        sums,
        kcal,
        real_energy_kcal,
        saturated_fat_percent: ratio_or_zero(kcal.saturated_fat, real_energy_kcal) * 100.0,
        simple_carbohydrate_percent: ratio_or_zero(kcal.simple_carbohydrate, real_energy_kcal) * 100.0,
        high_biologic_value_protein_percent: ratio_or_zero(
            100.0 * sums.high_biologic_value_protein_g,
            sums.protein_g,
        ),
    }
}

/// Goals the diet table is compared against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DietTargets {
    pub energy_kcal: f64,
    pub carbohydrate_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub high_biologic_value_protein_g: f64,
    pub saturated_fat_max_g: f64,
    pub simple_carbohydrate_max_g: f64,
}

impl DietTargets {
    pub fn from_distribution(distribution: &MacroDistribution) -> Self {
        let energy_kcal = distribution.energy_kcal;
        Self {
            energy_kcal,
            carbohydrate_g: distribution.carb.grams,
            protein_g: distribution.protein.grams,
            fat_g: distribution.fat.grams,
            high_biologic_value_protein_g: distribution.high_biologic_value_protein_g,
            saturated_fat_max_g: energy_kcal * SATURATED_FAT_TARGET_SHARE / FAT_KCAL_PER_G,
            simple_carbohydrate_max_g: energy_kcal * SIMPLE_CARB_TARGET_SHARE / CARB_KCAL_PER_G,
        }
    }
}

/// Totals plus the targets, when an energy target was given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopedFormulaReport {
    pub totals: DevelopedFormulaTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<DietTargets>,
}

/// The diet table with the energy target it is compared against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevelopedFormulaRequest {
    #[serde(default)]
    pub rows: Vec<DevelopedFormulaRow>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub energy_target_kcal: Option<f64>,
    #[serde(default)]
    pub macro_percent: Option<MacroPercent>,
}

/// Aggregate the table; targets are added when an energy target is given
pub fn report(request: &DevelopedFormulaRequest) -> EngineResult<DevelopedFormulaReport> {
    let totals = aggregate(&request.rows);
    let targets = match optional_positive(request.energy_target_kcal, "energy_target_kcal")? {
        Some(kcal) => {
            let distribution = distribute(kcal, &request.macro_percent.unwrap_or_default(), None, None)?;
            Some(DietTargets::from_distribution(&distribution))
        }
        None => None,
    };
    Ok(DevelopedFormulaReport { totals, targets })
}
