//! Engine input, options and output types

use crate::distribution::{MacroDistribution, MacroPercent};
use crate::health_metrics::{
    BiologicalSex, BmiCategory, BmiGranularity, BmrEquation, BoneFrame, FrameCategory, IdealWeightSource,
    NutritionalStatus, PpiCategory, PracticalFormula, WeightBasis,
};
use crate::locale::{deserialize_optional_decimal, deserialize_optional_whole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Input
// ============================================================================

/// One patient assessment
///
/// Measurements are optional at the type level so that a missing value is
/// reported by name during validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub sex: Option<BiologicalSex>,
    #[serde(default, deserialize_with = "deserialize_optional_whole")]
    pub age_years: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub waist_cm: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub wrist_cm: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub bone_frame_x: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub bone_frame_y: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub bone_frame_z: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub ideal_weight_manual_kg: Option<f64>,
    /// Typed formula such as `(71,2 + 80) / 2`, used instead of the X/Y/Z triple
    #[serde(default)]
    pub ideal_weight_expression: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub activity_factor: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub injury_factor: Option<f64>,
    #[serde(default)]
    pub macro_percent: Option<MacroPercent>,
    /// Overrides the computed TEE as the target of the macro distribution
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub energy_target_kcal: Option<f64>,

    // Report metadata, not used by the calculation
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub medical_diagnosis: Option<String>,
    #[serde(default)]
    pub nutritional_diagnosis: Option<String>,
}

impl PatientInput {
    pub fn bone_frame(&self) -> Option<BoneFrame> {
        BoneFrame::from_parts(self.bone_frame_x, self.bone_frame_y, self.bone_frame_z)
    }
}

/// The three inputs the body frame needs, known early in the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub height_cm: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub wrist_cm: Option<f64>,
    #[serde(default)]
    pub sex: Option<BiologicalSex>,
}

impl From<&PatientInput> for FrameInput {
    fn from(input: &PatientInput) -> Self {
        Self {
            height_cm: input.height_cm,
            wrist_cm: input.wrist_cm,
            sex: input.sex,
        }
    }
}

// ============================================================================
// Options
// ============================================================================

/// Formula variants applied to a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationOptions {
    pub bmi_granularity: BmiGranularity,
    pub bmr_equation: BmrEquation,
    /// When false only anthropometry is computed and sex, age and activity
    /// factor are not required
    pub compute_energy: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            bmi_granularity: BmiGranularity::default(),
            bmr_equation: BmrEquation::default(),
            compute_energy: true,
        }
    }
}

/// Per-request overrides; absent fields keep the configured default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOptionsOverride {
    #[serde(default)]
    pub bmi_granularity: Option<BmiGranularity>,
    #[serde(default)]
    pub bmr_equation: Option<BmrEquation>,
    #[serde(default)]
    pub compute_energy: Option<bool>,
}

impl CalculationOptions {
    pub fn with_overrides(&self, overrides: Option<&CalculationOptionsOverride>) -> Self {
        let Some(o) = overrides else {
            return *self;
        };
        Self {
            bmi_granularity: o.bmi_granularity.unwrap_or(self.bmi_granularity),
            bmr_equation: o.bmr_equation.unwrap_or(self.bmr_equation),
            compute_energy: o.compute_energy.unwrap_or(self.compute_energy),
        }
    }
}

/// Request body: the patient plus optional formula overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(flatten)]
    pub patient: PatientInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CalculationOptionsOverride>,
}

// ============================================================================
// Output
// ============================================================================

/// Basal and total energy expenditure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyMetrics {
    pub bmr_equation: BmrEquation,
    pub bmr: f64,
    pub activity_factor: f64,
    pub injury_factor: f64,
    pub total_energy_expenditure: f64,
}

/// Body frame computed on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAssessment {
    pub frame_ratio: f64,
    pub frame_category: FrameCategory,
    pub frame_label: String,
}

/// Everything derived from one [`PatientInput`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub ideal_weight_kg: f64,
    pub ideal_weight_source: IdealWeightSource,

    pub percent_ideal_weight: f64,
    pub ppi_category: PpiCategory,
    pub ppi_label: String,
    pub ppi_status: NutritionalStatus,

    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmi_label: String,
    pub bmi_status: NutritionalStatus,

    pub frame_ratio: f64,
    pub frame_category: FrameCategory,
    pub frame_label: String,

    pub weight_to_use_kg: f64,
    pub weight_basis: WeightBasis,
    pub weight_basis_label: String,
    pub adjusted_weight_kg: f64,

    pub practical_formula: PracticalFormula,

    pub waist_to_height_ratio: f64,
    pub cardiovascular_risk: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroDistribution>,

    pub options: CalculationOptions,
}
