//! Report export API routes

use crate::error::ApiError;
use crate::services::export::{ExportRequest, ExportService};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::post,
    Json, Router,
};

/// Create export routes
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/csv", post(export_csv))
}

/// POST /api/v1/export/csv - Assessment report as CSV
async fn export_csv(
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let csv = ExportService::export_csv(&state.default_options(), &request, state.config().report.decimals)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"nutriweb-report.csv\""),
    );

    Ok((headers, csv))
}
