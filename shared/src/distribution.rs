//! Macronutrient distribution of an energy target

use crate::errors::{EngineError, EngineResult};
use crate::validation::{optional_positive, require_positive, validate_percentage};
use serde::{Deserialize, Serialize};

/// Energy density of carbohydrate (kcal/g)
pub const CARB_KCAL_PER_G: f64 = 4.0;
/// Energy density of protein (kcal/g)
pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
/// Energy density of fat (kcal/g)
pub const FAT_KCAL_PER_G: f64 = 9.0;
/// Share of protein expected to be of high biologic value
pub const HIGH_BIOLOGIC_VALUE_SHARE: f64 = 0.70;
/// Tolerance of the advisory sum-to-100 check
pub const PERCENT_SUM_TOLERANCE: f64 = 0.1;

/// Percentage split of the energy target
///
/// Percentages are independent inputs and are never normalized; a sum other
/// than 100 is reported, not corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroPercent {
    pub carb: f64,
    pub protein: f64,
    pub fat: f64,
}

impl Default for MacroPercent {
    fn default() -> Self {
        Self {
            carb: 50.0,
            protein: 20.0,
            fat: 30.0,
        }
    }
}

impl MacroPercent {
    pub fn sum(&self) -> f64 {
        self.carb + self.protein + self.fat
    }

    pub fn is_complete(&self) -> bool {
        (self.sum() - 100.0).abs() < PERCENT_SUM_TOLERANCE
    }

    /// Check each percentage lies in 0-100
    pub fn validate(&self) -> EngineResult<()> {
        for (value, field) in [
            (self.carb, "macro_percent.carb"),
            (self.protein, "macro_percent.protein"),
            (self.fat, "macro_percent.fat"),
        ] {
            validate_percentage(value).map_err(|_| EngineError::MissingField { field })?;
        }
        Ok(())
    }
}

/// Energy and grams of one macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroAmount {
    pub percent: f64,
    pub kcal: f64,
    pub grams: f64,
}

impl MacroAmount {
    fn from_energy(energy_kcal: f64, percent: f64, kcal_per_g: f64) -> Self {
        let kcal = energy_kcal * percent / 100.0;
        Self {
            percent,
            kcal,
            grams: kcal / kcal_per_g,
        }
    }
}

/// Full macronutrient breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDistribution {
    pub energy_kcal: f64,
    pub carb: MacroAmount,
    pub protein: MacroAmount,
    pub fat: MacroAmount,
    pub high_biologic_value_protein_g: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g_per_kg_actual: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g_per_kg_adjusted: Option<f64>,
    pub percent_sum: f64,
    pub percent_sum_is_complete: bool,
}

/// Distribute an energy target across carbohydrate, protein and fat
///
/// Protein per kg is reported against each weight that is given; the
/// adjusted weight is only passed when it is the weight in use.
pub fn distribute(
    energy_kcal: f64,
    percent: &MacroPercent,
    actual_weight_kg: Option<f64>,
    adjusted_weight_kg: Option<f64>,
) -> EngineResult<MacroDistribution> {
    let energy_kcal = require_positive(Some(energy_kcal), "energy_target_kcal")?;
    percent.validate()?;
    let actual_weight_kg = optional_positive(actual_weight_kg, "weight_kg")?;
    let adjusted_weight_kg = optional_positive(adjusted_weight_kg, "adjusted_weight_kg")?;

    let carb = MacroAmount::from_energy(energy_kcal, percent.carb, CARB_KCAL_PER_G);
    let protein = MacroAmount::from_energy(energy_kcal, percent.protein, PROTEIN_KCAL_PER_G);
    let fat = MacroAmount::from_energy(energy_kcal, percent.fat, FAT_KCAL_PER_G);

    Ok(MacroDistribution {
        energy_kcal,
        carb,
        protein,
        fat,
        high_biologic_value_protein_g: protein.grams * HIGH_BIOLOGIC_VALUE_SHARE,
        protein_g_per_kg_actual: actual_weight_kg.map(|w| protein.grams / w),
        protein_g_per_kg_adjusted: adjusted_weight_kg.map(|w| protein.grams / w),
        percent_sum: percent.sum(),
        percent_sum_is_complete: percent.is_complete(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_split_of_2000_kcal() {
        let d = distribute(2000.0, &MacroPercent::default(), Some(80.0), None).unwrap();
        assert_eq!(d.carb.kcal, 1000.0);
        assert_eq!(d.carb.grams, 250.0);
        assert_eq!(d.protein.kcal, 400.0);
        assert_eq!(d.protein.grams, 100.0);
        assert_eq!(d.fat.kcal, 600.0);
        assert!((d.fat.grams - 66.666_666).abs() < 1e-4);
        assert!((d.high_biologic_value_protein_g - 70.0).abs() < 1e-9);
        assert_eq!(d.protein_g_per_kg_actual, Some(1.25));
        assert_eq!(d.protein_g_per_kg_adjusted, None);
        assert!(d.percent_sum_is_complete);
    }

    #[test]
    fn test_percentages_are_not_normalized() {
        let percent = MacroPercent {
            carb: 60.0,
            protein: 20.0,
            fat: 30.0,
        };
        let d = distribute(1000.0, &percent, None, None).unwrap();
        assert_eq!(d.carb.kcal, 600.0);
        assert_eq!(d.percent_sum, 110.0);
        assert!(!d.percent_sum_is_complete);
    }

    #[test]
    fn test_protein_per_adjusted_weight() {
        let d = distribute(2000.0, &MacroPercent::default(), Some(95.0), Some(80.0)).unwrap();
        assert_eq!(d.protein_g_per_kg_adjusted, Some(1.25));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(
            distribute(0.0, &MacroPercent::default(), None, None),
            Err(EngineError::MissingField {
                field: "energy_target_kcal"
            })
        );
        let percent = MacroPercent {
            carb: 120.0,
            protein: 20.0,
            fat: 30.0,
        };
        assert_eq!(
            distribute(2000.0, &percent, None, None),
            Err(EngineError::MissingField {
                field: "macro_percent.carb"
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: kcal / kcal-per-gram gives back the reported grams
        #[test]
        fn prop_gram_round_trip(
            energy in 500.0f64..5000.0,
            carb in 0.0f64..=100.0,
            protein in 0.0f64..=100.0,
            fat in 0.0f64..=100.0,
        ) {
            let percent = MacroPercent { carb, protein, fat };
            let d = distribute(energy, &percent, None, None).unwrap();
            prop_assert_eq!(d.carb.kcal / CARB_KCAL_PER_G, d.carb.grams);
            prop_assert_eq!(d.protein.kcal / PROTEIN_KCAL_PER_G, d.protein.grams);
            prop_assert_eq!(d.fat.kcal / FAT_KCAL_PER_G, d.fat.grams);
        }
    }
}
