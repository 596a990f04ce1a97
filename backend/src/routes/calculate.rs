//! Calculation API routes

use crate::error::{ApiError, ApiResult};
use crate::services::calculation::{CalculationService, DistributionRequest, ExpressionRequest, ExpressionResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use nutriweb_shared::developed_formula::DevelopedFormulaRequest;
use nutriweb_shared::{
    CalculationRequest, DerivedMetrics, DevelopedFormulaReport, FrameAssessment, FrameInput, MacroDistribution,
};

/// Plain-text answer of `/` to anything but POST
pub const WORKER_STATUS: &str = "NutriWeb worker active";

/// Create calculation routes
pub fn calculation_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/distribution", post(distribution))
        .route("/developed-formula", post(developed_formula))
        .route("/ideal-weight/expression", post(ideal_weight_expression))
        .route("/frame", post(frame))
}

/// POST / and POST /api/v1/calculate - Full assessment of one patient
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> ApiResult<Json<DerivedMetrics>> {
    let Json(request) = payload?;
    let metrics = CalculationService::calculate(&state.default_options(), &request)?;
    Ok(Json(metrics))
}

/// Any non-POST method on /
pub async fn worker_status() -> &'static str {
    WORKER_STATUS
}

/// POST /api/v1/distribution - Macronutrient split of an energy target
async fn distribution(
    payload: Result<Json<DistributionRequest>, JsonRejection>,
) -> Result<Json<MacroDistribution>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(CalculationService::distribution(&request)?))
}

/// POST /api/v1/developed-formula - Diet table totals and targets
async fn developed_formula(
    payload: Result<Json<DevelopedFormulaRequest>, JsonRejection>,
) -> Result<Json<DevelopedFormulaReport>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(CalculationService::developed_formula(&request)?))
}

/// POST /api/v1/ideal-weight/expression - Evaluate a typed ideal-weight formula
async fn ideal_weight_expression(
    payload: Result<Json<ExpressionRequest>, JsonRejection>,
) -> Result<Json<ExpressionResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(CalculationService::evaluate_expression(&request)?))
}

/// POST /api/v1/frame - Body frame from height, wrist and sex
async fn frame(payload: Result<Json<FrameInput>, JsonRejection>) -> ApiResult<Json<FrameAssessment>> {
    let Json(input) = payload?;
    Ok(Json(CalculationService::frame(&input)?))
}
