//! Health check endpoints
//!
//! - /health - service status and the formula variants in effect
//! - /health/live - liveness probe
//! - /health/ready - runs a reference assessment through the engine

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use nutriweb_shared::{calculate, BiologicalSex, BmiGranularity, BmrEquation, PatientInput};
use serde::Serialize;
use tracing::error;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineDefaults>,
}

/// Formula variants used when a request does not choose its own
#[derive(Serialize)]
pub struct EngineDefaults {
    pub bmi_granularity: BmiGranularity,
    pub bmr_equation: BmrEquation,
    pub compute_energy: bool,
}

impl HealthResponse {
    fn new(status: &str, engine: Option<EngineDefaults>) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            engine,
        }
    }
}

fn engine_defaults(state: &AppState) -> EngineDefaults {
    let options = state.default_options();
    EngineDefaults {
        bmi_granularity: options.bmi_granularity,
        bmr_equation: options.bmr_equation,
        compute_energy: options.compute_energy,
    }
}

/// Patient with a known outcome: ideal weight 75.6 kg, normal PPI
fn reference_patient() -> PatientInput {
    PatientInput {
        weight_kg: Some(71.2),
        height_cm: Some(179.0),
        sex: Some(BiologicalSex::Male),
        age_years: Some(30),
        waist_cm: Some(100.0),
        wrist_cm: Some(18.0),
        bone_frame_x: Some(71.2),
        bone_frame_y: Some(80.0),
        bone_frame_z: Some(2.0),
        activity_factor: Some(1.2),
        ..Default::default()
    }
}

/// Basic health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", Some(engine_defaults(&state))))
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive", None))
}

/// Readiness probe
///
/// Returns 503 when the reference assessment fails under the configured
/// defaults.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let defaults = engine_defaults(&state);
    match calculate(&reference_patient(), &state.default_options()) {
        Ok(metrics) if metrics.ideal_weight_kg > 0.0 => Ok(Json(HealthResponse::new("ready", Some(defaults)))),
        Ok(_) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("not_ready", Some(defaults))),
        )),
        Err(e) => {
            error!(error = %e, "Reference assessment failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new("not_ready", Some(defaults))),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_health_check_reports_engine_defaults() {
        let state = AppState::new(AppConfig::default());
        let response = health_check(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
        let engine = response.engine.as_ref().unwrap();
        assert_eq!(engine.bmr_equation, BmrEquation::HarrisBenedict);
        assert!(engine.compute_energy);
    }

    #[tokio::test]
    async fn test_liveness_check_returns_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
        assert!(response.engine.is_none());
    }

    #[tokio::test]
    async fn test_readiness_runs_reference_assessment() {
        let mut config = AppConfig::default();
        config.engine.compute_energy = false;
        let response = readiness_check(State(AppState::new(config))).await;
        assert!(response.is_ok());
    }
}
