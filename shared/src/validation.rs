//! Input validation functions
//!
//! Required numeric inputs must be present, finite and strictly positive.
//! Failures name the offending field so the caller can correct exactly that
//! input; nothing is silently coerced to zero.

use crate::errors::{EngineError, EngineResult};

/// Require a present, finite, strictly positive value
pub fn require_positive(value: Option<f64>, field: &'static str) -> EngineResult<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(EngineError::MissingField { field }),
    }
}

/// Require a present, strictly positive integer
pub fn require_positive_int(value: Option<i32>, field: &'static str) -> EngineResult<i32> {
    match value {
        Some(v) if v > 0 => Ok(v),
        _ => Err(EngineError::MissingField { field }),
    }
}

/// Accept an absent value, but reject one that is present and not positive
pub fn optional_positive(value: Option<f64>, field: &'static str) -> EngineResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) => require_positive(Some(v), field).map(Some),
    }
}

/// Validate percentage value (0-100)
pub fn validate_percentage(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("Percentage must be a valid number".to_string());
    }
    if !(0.0..=100.0).contains(&value) {
        return Err("Percentage must be between 0 and 100".to_string());
    }
    Ok(())
}

/// Divide, failing when the denominator is zero or the result is not finite
pub fn guarded_ratio(numerator: f64, denominator: f64, quantity: &'static str) -> EngineResult<f64> {
    if denominator == 0.0 {
        return Err(EngineError::DivisionGuard { quantity });
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(EngineError::DivisionGuard { quantity })
    }
}

/// Divide, reporting 0 when the denominator is zero
///
/// Used for diet-table percentages where an empty table is a normal state.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "weight_kg" => "Current Weight",
        "height_cm" => "Height",
        "waist_cm" => "Waist Circumference",
        "wrist_cm" => "Wrist Circumference",
        "age_years" => "Age",
        "sex" => "Sex",
        "activity_factor" => "Activity Factor",
        "injury_factor" => "Injury Factor",
        "ideal_weight_manual_kg" => "Ideal Weight",
        "ideal_weight_expression" => "Ideal Weight Formula",
        "energy_target_kcal" => "Energy Target",
        "macro_percent.carb" => "Carbohydrate %",
        "macro_percent.protein" => "Protein %",
        "macro_percent.fat" => "Fat %",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl From<&EngineError> for ValidationError {
    fn from(err: &EngineError) -> Self {
        ValidationError::new(err.field().unwrap_or("input"), &err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive(Some(70.0), "weight_kg"), Ok(70.0));
        assert_eq!(
            require_positive(None, "weight_kg"),
            Err(EngineError::MissingField { field: "weight_kg" })
        );
        assert!(require_positive(Some(0.0), "weight_kg").is_err());
        assert!(require_positive(Some(-3.0), "weight_kg").is_err());
        assert!(require_positive(Some(f64::NAN), "weight_kg").is_err());
        assert!(require_positive(Some(f64::INFINITY), "weight_kg").is_err());
    }

    #[test]
    fn test_optional_positive() {
        assert_eq!(optional_positive(None, "injury_factor"), Ok(None));
        assert_eq!(optional_positive(Some(1.2), "injury_factor"), Ok(Some(1.2)));
        assert_eq!(
            optional_positive(Some(0.0), "injury_factor"),
            Err(EngineError::MissingField { field: "injury_factor" })
        );
    }

    #[test]
    fn test_require_positive_int() {
        assert_eq!(require_positive_int(Some(30), "age_years"), Ok(30));
        assert!(require_positive_int(Some(0), "age_years").is_err());
        assert!(require_positive_int(None, "age_years").is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(50.0).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(-1.0).is_err());
        assert!(validate_percentage(101.0).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
    }

    #[test]
    fn test_guarded_ratio() {
        assert_eq!(guarded_ratio(10.0, 4.0, "x"), Ok(2.5));
        assert_eq!(
            guarded_ratio(10.0, 0.0, "frame_ratio"),
            Err(EngineError::DivisionGuard { quantity: "frame_ratio" })
        );
        assert!(guarded_ratio(f64::MAX, f64::MIN_POSITIVE, "x").is_err());
    }

    #[test]
    fn test_ratio_or_zero() {
        assert_eq!(ratio_or_zero(5.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(0.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(5.0, 2.0), 2.5);
    }

    #[test]
    fn test_field_display_labels() {
        assert_eq!(get_field_display_label("wrist_cm"), "Wrist Circumference");
        assert_eq!(get_field_display_label("activity_factor"), "Activity Factor");
        assert_eq!(get_field_display_label("unknown_field"), "unknown_field");
    }

    #[test]
    fn test_validation_error_from_engine_error() {
        let err = ValidationError::from(&EngineError::MissingField { field: "height_cm" });
        assert_eq!(err.field, "height_cm");
        assert_eq!(err.display_label, "Height");
        assert_eq!(err.user_message(), "Height: Missing or invalid value for height_cm");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_positive_values_pass(v in 0.001f64..10_000.0) {
            prop_assert_eq!(require_positive(Some(v), "weight_kg"), Ok(v));
        }

        #[test]
        fn prop_non_positive_values_fail(v in -10_000.0f64..=0.0) {
            prop_assert!(require_positive(Some(v), "weight_kg").is_err());
        }

        #[test]
        fn prop_valid_percentage_range(pct in 0.0f64..=100.0) {
            prop_assert!(validate_percentage(pct).is_ok());
        }
    }
}
