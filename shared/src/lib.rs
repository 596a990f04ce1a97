//! NutriWeb Shared Library
//!
//! The nutritional formula engine: patient input and derived metric types,
//! the anthropometric and energy formulas, macro distribution, the developed
//! formula aggregator, and the locale and expression helpers used at the
//! edges. Everything here is pure and synchronous; the backend and WASM
//! crates wrap it.

pub mod developed_formula;
pub mod distribution;
pub mod engine;
pub mod errors;
pub mod expression;
pub mod health_metrics;
pub mod locale;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use developed_formula::{
    aggregate, DevelopedFormulaReport, DevelopedFormulaRequest, DevelopedFormulaRow, DevelopedFormulaTotals, DietTargets,
};
pub use distribution::{distribute, MacroDistribution, MacroPercent};
pub use engine::{assess_frame, calculate};
pub use errors::*;
pub use health_metrics::*;
pub use types::*;
