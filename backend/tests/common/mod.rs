//! Common test utilities for integration tests
//!
//! Builds the full router around a default configuration and drives it
//! in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use nutriweb_backend::{config::AppConfig, routes, state::AppState};
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
}

impl TestApp {
    /// Create a new test application with the default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config);
        let app = routes::create_router(state);
        Self { app }
    }

    /// Make a request with an optional JSON body
    pub async fn request(&self, method: &str, path: &str, body: Option<&str>) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, headers, body_str)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let (status, _, body) = self.request("GET", path, None).await;
        (status, body)
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let (status, _, body) = self.request("POST", path, Some(body)).await;
        (status, body)
    }

    /// POST and parse the JSON response
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.post(path, &body.to_string()).await;
        let json = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

/// The reference patient used across the integration tests
pub fn reference_patient() -> serde_json::Value {
    serde_json::json!({
        "weight_kg": 71.2,
        "height_cm": 179,
        "sex": "male",
        "age_years": 30,
        "waist_cm": 100,
        "wrist_cm": 18,
        "bone_frame_x": 71.2,
        "bone_frame_y": 80,
        "bone_frame_z": 2,
        "activity_factor": 1.2
    })
}
