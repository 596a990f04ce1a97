//! Browser tests, run with `wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use nutriweb_wasm::{calculate_json, evaluate_expression, format_decimal, frame_json};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn calculates_reference_patient() {
    let input = r#"{
        "weight_kg": "71,2", "height_cm": 179, "sex": "femenino", "age_years": 30,
        "waist_cm": 100, "wrist_cm": 18, "ideal_weight_expression": "(71,2 + 80) / 2",
        "activity_factor": 1.2
    }"#;
    match calculate_json(input) {
        Ok(output) => assert!(output.contains("\"ideal_weight_source\":\"expression\"")),
        Err(_) => panic!("calculation failed"),
    }
}

#[wasm_bindgen_test]
fn invalid_input_throws() {
    assert!(calculate_json("{}").is_err());
}

#[wasm_bindgen_test]
fn classifies_frame_early() {
    match frame_json(r#"{"height_cm": 160, "wrist_cm": "15,5", "sex": "f"}"#) {
        Ok(output) => assert!(output.contains("\"frame_category\":\"medium\"")),
        Err(_) => panic!("frame failed"),
    }
}

#[wasm_bindgen_test]
fn scalar_helpers() {
    assert!(evaluate_expression("4 / 0").is_nan());
    assert_eq!(format_decimal(75.6, 1), "75,6");
}
