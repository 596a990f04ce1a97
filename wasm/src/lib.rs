//! NutriWeb WASM Module
//!
//! Browser bindings for the formula engine. The page calls these
//! synchronously on every form change; JSON crosses the boundary as strings.

use nutriweb_shared::developed_formula::{self, DevelopedFormulaRequest};
use nutriweb_shared::validation::ValidationError;
use nutriweb_shared::{
    assess_frame, calculate, expression, locale, CalculationOptions, CalculationRequest, EngineError, FrameInput,
};
use wasm_bindgen::prelude::*;

/// Message shown next to the form; prefixed with the field label when there is one
fn form_message(err: &EngineError) -> String {
    match err.field() {
        Some(_) => ValidationError::from(err).user_message(),
        None => err.to_string(),
    }
}

fn calculate_inner(input_json: &str) -> Result<String, String> {
    let request: CalculationRequest = serde_json::from_str(input_json).map_err(|e| e.to_string())?;
    let options = CalculationOptions::default().with_overrides(request.options.as_ref());
    let metrics = calculate(&request.patient, &options).map_err(|e| form_message(&e))?;
    serde_json::to_string(&metrics).map_err(|e| e.to_string())
}

fn developed_formula_inner(request_json: &str) -> Result<String, String> {
    let request: DevelopedFormulaRequest = serde_json::from_str(request_json).map_err(|e| e.to_string())?;
    let report = developed_formula::report(&request).map_err(|e| form_message(&e))?;
    serde_json::to_string(&report).map_err(|e| e.to_string())
}

fn frame_inner(input_json: &str) -> Result<String, String> {
    let input: FrameInput = serde_json::from_str(input_json).map_err(|e| e.to_string())?;
    let frame = assess_frame(&input).map_err(|e| form_message(&e))?;
    serde_json::to_string(&frame).map_err(|e| e.to_string())
}

/// Full assessment; throws the validation message on failure
#[wasm_bindgen]
pub fn calculate_json(input_json: &str) -> Result<String, JsError> {
    calculate_inner(input_json).map_err(|e| JsError::new(&e))
}

/// Diet-table totals, with targets when an energy target is given
#[wasm_bindgen]
pub fn developed_formula_json(request_json: &str) -> Result<String, JsError> {
    developed_formula_inner(request_json).map_err(|e| JsError::new(&e))
}

/// Body frame as soon as height, wrist and sex are filled in
#[wasm_bindgen]
pub fn frame_json(input_json: &str) -> Result<String, JsError> {
    frame_inner(input_json).map_err(|e| JsError::new(&e))
}

/// Evaluate a typed ideal-weight formula; NaN unless it yields a positive weight
#[wasm_bindgen]
pub fn evaluate_expression(text: &str) -> f64 {
    expression::evaluate(text)
        .ok()
        .filter(|kg| *kg > 0.0)
        .unwrap_or(f64::NAN)
}

/// Parse a form value typed with either decimal separator; NaN when invalid
#[wasm_bindgen]
pub fn parse_decimal(text: &str) -> f64 {
    locale::parse_decimal(text).unwrap_or(f64::NAN)
}

/// Format as `1.234,56`
#[wasm_bindgen]
pub fn format_decimal(value: f64, decimals: usize) -> String {
    locale::format_decimal(value, decimals)
}
