//! Calculation service
//!
//! Applies per-request option overrides on top of the configured defaults
//! and runs the engine. Also hosts the standalone distribution,
//! developed-formula and expression operations exposed by the API.

use crate::error::ApiError;
use nutriweb_shared::developed_formula::{self, DevelopedFormulaReport, DevelopedFormulaRequest};
use nutriweb_shared::distribution::{distribute, MacroDistribution, MacroPercent};
use nutriweb_shared::{
    assess_frame, calculate, expression, CalculationOptions, CalculationRequest, DerivedMetrics, EngineError,
    FrameAssessment, FrameInput,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distribution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionRequest {
    pub energy_kcal: f64,
    #[serde(default)]
    pub macro_percent: Option<MacroPercent>,
    #[serde(default)]
    pub actual_weight_kg: Option<f64>,
    #[serde(default)]
    pub adjusted_weight_kg: Option<f64>,
}

/// Expression request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionRequest {
    pub expression: String,
}

/// Expression response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionResponse {
    pub ideal_weight_kg: f64,
}

pub struct CalculationService;

impl CalculationService {
    /// Run the full assessment with the request's overrides applied
    pub fn calculate(defaults: &CalculationOptions, request: &CalculationRequest) -> Result<DerivedMetrics, ApiError> {
        let options = defaults.with_overrides(request.options.as_ref());
        debug!(?options, "Calculating derived metrics");

        let metrics = calculate(&request.patient, &options)?;

        debug!(
            ideal_weight_kg = metrics.ideal_weight_kg,
            ppi = metrics.percent_ideal_weight,
            bmi = metrics.bmi,
            "Calculation complete"
        );
        Ok(metrics)
    }

    /// Distribute an energy target
    pub fn distribution(request: &DistributionRequest) -> Result<MacroDistribution, ApiError> {
        let percent = request.macro_percent.unwrap_or_default();
        Ok(distribute(
            request.energy_kcal,
            &percent,
            request.actual_weight_kg,
            request.adjusted_weight_kg,
        )?)
    }

    /// Aggregate the diet table; targets are added when an energy target is given
    pub fn developed_formula(request: &DevelopedFormulaRequest) -> Result<DevelopedFormulaReport, ApiError> {
        let report = developed_formula::report(request)?;
        debug!(
            rows = report.totals.row_count,
            real_energy_kcal = report.totals.real_energy_kcal,
            "Developed formula aggregated"
        );
        Ok(report)
    }

    /// Classify the body frame ahead of the full assessment
    pub fn frame(input: &FrameInput) -> Result<FrameAssessment, ApiError> {
        let frame = assess_frame(input)?;
        debug!(ratio = frame.frame_ratio, category = ?frame.frame_category, "Frame classified");
        Ok(frame)
    }

    /// Evaluate a typed ideal-weight formula
    pub fn evaluate_expression(request: &ExpressionRequest) -> Result<ExpressionResponse, ApiError> {
        let value = expression::evaluate(&request.expression)
            .map_err(|e| EngineError::InvalidExpression(e.to_string()))?;
        if value <= 0.0 {
            return Err(EngineError::InvalidIdealWeight.into());
        }
        Ok(ExpressionResponse { ideal_weight_kg: value })
    }
}
