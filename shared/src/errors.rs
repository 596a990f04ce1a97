//! Error types for the NutriWeb formula engine

use thiserror::Error;

/// Engine error types
///
/// Every variant is a validation outcome the caller can fix by supplying
/// different input. Nothing is retried and nothing is partially computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A required numeric field is absent, not finite, or not strictly positive
    #[error("Missing or invalid value for {field}")]
    MissingField { field: &'static str },

    /// Neither the bone-frame data, an expression, nor the manual override
    /// produced a positive ideal weight
    #[error("Ideal weight could not be determined")]
    InvalidIdealWeight,

    /// The ideal-weight expression could not be evaluated
    #[error("Invalid ideal weight expression: {0}")]
    InvalidExpression(String),

    /// A ratio had a zero denominator or produced a non-finite value
    #[error("Division guard triggered while computing {quantity}")]
    DivisionGuard { quantity: &'static str },
}

impl EngineError {
    /// Name of the offending input field, when the error points at one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EngineError::MissingField { field } => Some(field),
            EngineError::InvalidIdealWeight => Some("ideal_weight_manual_kg"),
            EngineError::InvalidExpression(_) => Some("ideal_weight_expression"),
            EngineError::DivisionGuard { .. } => None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::MissingField { .. } => "MISSING_FIELD",
            EngineError::InvalidIdealWeight => "INVALID_IDEAL_WEIGHT",
            EngineError::InvalidExpression(_) => "INVALID_EXPRESSION",
            EngineError::DivisionGuard { .. } => "DIVISION_GUARD",
        }
    }

    /// Whether the error was caused by caller input rather than an
    /// internal arithmetic fault
    pub fn is_validation(&self) -> bool {
        !matches!(self, EngineError::DivisionGuard { .. })
    }
}

/// Result alias used throughout the engine
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = EngineError::MissingField { field: "weight_kg" };
        assert_eq!(err.field(), Some("weight_kg"));
        assert_eq!(err.code(), "MISSING_FIELD");
        assert_eq!(err.to_string(), "Missing or invalid value for weight_kg");
        assert!(err.is_validation());
    }

    #[test]
    fn test_division_guard_is_not_validation() {
        let err = EngineError::DivisionGuard { quantity: "bmi" };
        assert_eq!(err.field(), None);
        assert!(!err.is_validation());
    }
}
