//! Health metrics calculations module
//!
//! Provides the anthropometric formulas and threshold classifiers of the
//! nutritional assessment: ideal weight, percent of ideal weight (PPI), BMI,
//! body frame, effective weight, basal metabolic rate, total energy
//! expenditure, the practical kcal/kg formula and the waist-to-height ratio.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Explicit Strategies**: Formula variants are selected, never guessed
//! 3. **Inclusive-low Brackets**: Every range is `[low, high)` unless stated
//! 4. **Type Safety**: Categories are enums, labels are derived from them

use crate::errors::{EngineError, EngineResult};
use crate::expression;
use crate::validation::guarded_ratio;
use serde::{Deserialize, Serialize};

// ============================================================================
// Patient Profile Types
// ============================================================================

/// Biological sex for physiological calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    #[serde(alias = "masculino", alias = "m")]
    Male,
    #[serde(alias = "femenino", alias = "f")]
    Female,
}

/// Coarse nutritional status shared by the PPI and BMI classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionalStatus {
    Malnutrition,
    Normal,
    Overweight,
    Obesity,
}

// ============================================================================
// Ideal Weight
// ============================================================================

/// Bone-frame measurements used to derive ideal weight as `(X + Y) / Z`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneFrame {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoneFrame {
    /// Build a frame only when all three values are present
    pub fn from_parts(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Option<Self> {
        match (x, y, z) {
            (Some(x), Some(y), Some(z)) => Some(Self { x, y, z }),
            _ => None,
        }
    }

    /// Derived ideal weight, `None` when `Z` is zero or a value is not finite
    pub fn ideal_weight_kg(&self) -> Option<f64> {
        if self.z == 0.0 || !self.x.is_finite() || !self.y.is_finite() || !self.z.is_finite() {
            return None;
        }
        Some((self.x + self.y) / self.z)
    }
}

/// Where the resolved ideal weight came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdealWeightSource {
    BoneFrame,
    Expression,
    Manual,
}

impl IdealWeightSource {
    pub fn label(&self) -> &'static str {
        match self {
            IdealWeightSource::BoneFrame => "Bone frame (X+Y)/Z",
            IdealWeightSource::Expression => "Formula",
            IdealWeightSource::Manual => "Manual",
        }
    }
}

/// Resolved ideal weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealWeight {
    pub kg: f64,
    pub source: IdealWeightSource,
}

/// Resolve the ideal weight by precedence
///
/// 1. A non-blank expression, else the bone-frame triple, gives the derived value.
/// 2. A positive manual value overrides the derived value unconditionally.
/// 3. Anything that does not end positive fails; an unparseable expression
///    fails with its own error unless the manual value rescued it.
pub fn resolve_ideal_weight(
    bone_frame: Option<BoneFrame>,
    expression_text: Option<&str>,
    manual_kg: Option<f64>,
) -> EngineResult<IdealWeight> {
    let mut derived = None;
    let mut expression_error = None;

    match expression_text.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => match expression::evaluate(text) {
            Ok(kg) => derived = Some((kg, IdealWeightSource::Expression)),
            Err(e) => expression_error = Some(e),
        },
        None => {
            derived = bone_frame
                .and_then(|frame| frame.ideal_weight_kg())
                .map(|kg| (kg, IdealWeightSource::BoneFrame));
        }
    }

    if let Some(kg) = manual_kg.filter(|kg| kg.is_finite() && *kg > 0.0) {
        return Ok(IdealWeight {
            kg,
            source: IdealWeightSource::Manual,
        });
    }

    if let Some(err) = expression_error {
        return Err(EngineError::InvalidExpression(err.to_string()));
    }

    match derived {
        Some((kg, source)) if kg.is_finite() && kg > 0.0 => Ok(IdealWeight { kg, source }),
        _ => Err(EngineError::InvalidIdealWeight),
    }
}

// ============================================================================
// Percent of Ideal Weight (PPI)
// ============================================================================

/// PPI classification, ordered from most to least severe excess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PpiCategory {
    MorbidObesity,
    #[serde(rename = "obesity_ii")]
    ObesityII,
    ObesityI,
    Overweight,
    Normal,
    MildMalnutrition,
    ModerateMalnutrition,
    SevereMalnutrition,
}

impl PpiCategory {
    /// Get a human-readable description
    pub fn label(&self) -> &'static str {
        match self {
            PpiCategory::MorbidObesity => "Morbid obesity",
            PpiCategory::ObesityII => "Obesity II",
            PpiCategory::ObesityI => "Obesity I",
            PpiCategory::Overweight => "Overweight",
            PpiCategory::Normal => "Normal",
            PpiCategory::MildMalnutrition => "Mild malnutrition",
            PpiCategory::ModerateMalnutrition => "Moderate malnutrition",
            PpiCategory::SevereMalnutrition => "Severe malnutrition",
        }
    }

    pub fn status(&self) -> NutritionalStatus {
        match self {
            PpiCategory::MorbidObesity | PpiCategory::ObesityII => NutritionalStatus::Obesity,
            PpiCategory::ObesityI | PpiCategory::Overweight => NutritionalStatus::Overweight,
            PpiCategory::Normal => NutritionalStatus::Normal,
            PpiCategory::MildMalnutrition
            | PpiCategory::ModerateMalnutrition
            | PpiCategory::SevereMalnutrition => NutritionalStatus::Malnutrition,
        }
    }
}

/// Calculate percent of ideal weight
///
/// Formula: PPI = weight / ideal weight × 100
pub fn calculate_ppi(weight_kg: f64, ideal_weight_kg: f64) -> EngineResult<f64> {
    guarded_ratio(weight_kg, ideal_weight_kg, "percent_ideal_weight").map(|r| r * 100.0)
}

/// Classify PPI, first match wins from the top
pub fn classify_ppi(ppi: f64) -> PpiCategory {
    if ppi > 180.0 {
        PpiCategory::MorbidObesity
    } else if ppi >= 140.0 {
        PpiCategory::ObesityII
    } else if ppi >= 120.0 {
        PpiCategory::ObesityI
    } else if ppi >= 110.0 {
        PpiCategory::Overweight
    } else if ppi >= 90.0 {
        PpiCategory::Normal
    } else if ppi >= 85.0 {
        PpiCategory::MildMalnutrition
    } else if ppi >= 75.0 {
        PpiCategory::ModerateMalnutrition
    } else {
        PpiCategory::SevereMalnutrition
    }
}

// ============================================================================
// BMI Calculations
// ============================================================================

/// How finely BMI is bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BmiGranularity {
    /// WHO six buckets up to obesity III
    #[default]
    Who6,
    /// Underweight / normal / overweight / obesity
    Coarse,
}

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    #[serde(rename = "obesity_ii")]
    ObesityII,
    #[serde(rename = "obesity_iii")]
    ObesityIII,
    /// Only produced by the coarse granularity
    Obesity,
}

impl BmiCategory {
    /// Get a human-readable description
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObesityI => "Obesity I",
            BmiCategory::ObesityII => "Obesity II",
            BmiCategory::ObesityIII => "Obesity III (morbid)",
            BmiCategory::Obesity => "Obesity",
        }
    }

    pub fn status(&self) -> NutritionalStatus {
        match self {
            BmiCategory::Underweight => NutritionalStatus::Malnutrition,
            BmiCategory::Normal => NutritionalStatus::Normal,
            BmiCategory::Overweight => NutritionalStatus::Overweight,
            BmiCategory::ObesityI
            | BmiCategory::ObesityII
            | BmiCategory::ObesityIII
            | BmiCategory::Obesity => NutritionalStatus::Obesity,
        }
    }
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> EngineResult<f64> {
    let height_m = height_cm / 100.0;
    guarded_ratio(weight_kg, height_m * height_m, "bmi")
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64, granularity: BmiGranularity) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        match granularity {
            BmiGranularity::Coarse => BmiCategory::Obesity,
            BmiGranularity::Who6 if bmi < 35.0 => BmiCategory::ObesityI,
            BmiGranularity::Who6 if bmi < 40.0 => BmiCategory::ObesityII,
            BmiGranularity::Who6 => BmiCategory::ObesityIII,
        }
    }
}

// ============================================================================
// Body Frame
// ============================================================================

/// Skeletal frame size from the height/wrist ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCategory {
    Small,
    Medium,
    Large,
    /// Sex was not given, so no bracket applies
    Undetermined,
}

impl FrameCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FrameCategory::Small => "Small",
            FrameCategory::Medium => "Medium",
            FrameCategory::Large => "Large",
            FrameCategory::Undetermined => "Undetermined",
        }
    }
}

/// Calculate frame ratio: height(cm) / wrist circumference(cm)
pub fn calculate_frame_ratio(height_cm: f64, wrist_cm: f64) -> EngineResult<f64> {
    guarded_ratio(height_cm, wrist_cm, "frame_ratio")
}

/// Classify frame ratio by sex
pub fn classify_frame(ratio: f64, sex: Option<BiologicalSex>) -> FrameCategory {
    let (small_above, medium_from) = match sex {
        Some(BiologicalSex::Male) => (10.4, 9.6),
        Some(BiologicalSex::Female) => (11.0, 10.1),
        None => return FrameCategory::Undetermined,
    };

    if ratio > small_above {
        FrameCategory::Small
    } else if ratio >= medium_from {
        FrameCategory::Medium
    } else {
        FrameCategory::Large
    }
}

// ============================================================================
// Effective Weight
// ============================================================================

/// Fraction of the excess over ideal weight kept by the adjusted weight
pub const ADJUSTED_WEIGHT_FACTOR: f64 = 0.25;

/// Which weight feeds the energy formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBasis {
    Actual,
    Adjusted,
}

impl WeightBasis {
    pub fn label(&self) -> &'static str {
        match self {
            WeightBasis::Actual => "Actual weight",
            WeightBasis::Adjusted => "Adjusted weight",
        }
    }
}

/// Selected weight plus the adjusted weight it was chosen against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveWeight {
    pub weight_kg: f64,
    pub basis: WeightBasis,
    pub adjusted_weight_kg: f64,
}

/// Calculate adjusted weight
///
/// Formula: PA = ideal + 0.25 × (actual - ideal)
pub fn calculate_adjusted_weight(weight_kg: f64, ideal_weight_kg: f64) -> f64 {
    ideal_weight_kg + ADJUSTED_WEIGHT_FACTOR * (weight_kg - ideal_weight_kg)
}

/// Overweight by either criterion: BMI ≥ 25 or PPI ≥ 110
pub fn needs_adjusted_weight(bmi: f64, ppi: f64) -> bool {
    bmi >= 25.0 || ppi >= 110.0
}

/// Select the weight used by the energy formulas
pub fn select_effective_weight(weight_kg: f64, ideal_weight_kg: f64, bmi: f64, ppi: f64) -> EffectiveWeight {
    let adjusted_weight_kg = calculate_adjusted_weight(weight_kg, ideal_weight_kg);
    if needs_adjusted_weight(bmi, ppi) {
        EffectiveWeight {
            weight_kg: adjusted_weight_kg,
            basis: WeightBasis::Adjusted,
            adjusted_weight_kg,
        }
    } else {
        EffectiveWeight {
            weight_kg,
            basis: WeightBasis::Actual,
            adjusted_weight_kg,
        }
    }
}

// ============================================================================
// BMR and TEE Calculations
// ============================================================================

/// BMR calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BmrEquation {
    /// Harris-Benedict (original 1919 coefficients)
    #[default]
    HarrisBenedict,
    /// Mifflin-St Jeor
    MifflinStJeor,
}

impl BmrEquation {
    pub fn label(&self) -> &'static str {
        match self {
            BmrEquation::HarrisBenedict => "Harris-Benedict",
            BmrEquation::MifflinStJeor => "Mifflin-St Jeor",
        }
    }
}

/// Calculate BMR using the original Harris-Benedict equation
///
/// Men: BMR = 66.47 + 13.75 × weight(kg) + 5 × height(cm) - 6.75 × age(y)
/// Women: BMR = 655.1 + 9.56 × weight(kg) + 1.85 × height(cm) - 4.68 × age(y)
pub fn calculate_bmr_harris_benedict(weight_kg: f64, height_cm: f64, age_years: i32, sex: BiologicalSex) -> f64 {
    let age = age_years as f64;
    match sex {
        BiologicalSex::Male => 66.47 + 13.75 * weight_kg + 5.0 * height_cm - 6.75 * age,
        BiologicalSex::Female => 655.1 + 9.56 * weight_kg + 1.85 * height_cm - 4.68 * age,
    }
}

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: i32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female => base - 161.0,
    }
}

/// Calculate BMR with specified equation
pub fn calculate_bmr(
    equation: BmrEquation,
    weight_kg: f64,
    height_cm: f64,
    age_years: i32,
    sex: BiologicalSex,
) -> f64 {
    match equation {
        BmrEquation::HarrisBenedict => calculate_bmr_harris_benedict(weight_kg, height_cm, age_years, sex),
        BmrEquation::MifflinStJeor => calculate_bmr_mifflin(weight_kg, height_cm, age_years, sex),
    }
}

/// Calculate Total Energy Expenditure
///
/// TEE = BMR × activity factor × injury factor
pub fn calculate_tee(bmr: f64, activity_factor: f64, injury_factor: f64) -> f64 {
    bmr * activity_factor * injury_factor
}

// ============================================================================
// Practical kcal/kg Formula
// ============================================================================

/// Practical energy estimate: a weight times a kcal/kg factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PracticalFormula {
    pub weight_kg: f64,
    pub kcal_per_kg: f64,
    pub kcal: f64,
}

/// Calculate the practical formula from the PPI bracket
///
/// PPI ≥ 110 uses the effective weight at 25 kcal/kg; below that the actual
/// weight is used at 30, 30, 40 and 45 kcal/kg for the normal, mild,
/// moderate and severe brackets.
pub fn calculate_practical_formula(ppi: f64, actual_weight_kg: f64, effective_weight_kg: f64) -> PracticalFormula {
    let (weight_kg, kcal_per_kg) = if ppi >= 110.0 {
        (effective_weight_kg, 25.0)
    } else if ppi >= 90.0 {
        (actual_weight_kg, 30.0)
    } else if ppi >= 85.0 {
        (actual_weight_kg, 30.0)
    } else if ppi >= 75.0 {
        (actual_weight_kg, 40.0)
    } else {
        (actual_weight_kg, 45.0)
    };

    PracticalFormula {
        weight_kg,
        kcal_per_kg,
        kcal: weight_kg * kcal_per_kg,
    }
}

// ============================================================================
// Waist-to-Height Ratio
// ============================================================================

/// Ratio above which cardiovascular risk is flagged
pub const WAIST_TO_HEIGHT_RISK_THRESHOLD: f64 = 0.5;

/// Waist-to-height result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaistToHeight {
    pub ratio: f64,
    pub cardiovascular_risk: bool,
}

/// Calculate waist-to-height ratio and risk flag
pub fn calculate_waist_to_height(waist_cm: f64, height_cm: f64) -> EngineResult<WaistToHeight> {
    let ratio = guarded_ratio(waist_cm, height_cm, "waist_to_height_ratio")?;
    Ok(WaistToHeight {
        ratio,
        cardiovascular_risk: ratio > WAIST_TO_HEIGHT_RISK_THRESHOLD,
    })
}
