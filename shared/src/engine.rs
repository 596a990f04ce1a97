//! The calculation pipeline
//!
//! `calculate` validates every required field first, then resolves the ideal
//! weight, and only then derives the metrics. Any failure returns a single
//! error and no partial result.

use crate::distribution::distribute;
use crate::errors::{EngineError, EngineResult};
use crate::health_metrics::{
    calculate_bmi, calculate_bmr, calculate_frame_ratio, calculate_ppi, calculate_practical_formula,
    calculate_tee, calculate_waist_to_height, classify_bmi, classify_frame, classify_ppi, resolve_ideal_weight,
    select_effective_weight, BiologicalSex, WeightBasis,
};
use crate::types::{CalculationOptions, DerivedMetrics, EnergyMetrics, FrameAssessment, FrameInput, PatientInput};
use crate::validation::{optional_positive, require_positive, require_positive_int};

struct EnergyInputs {
    sex: BiologicalSex,
    age_years: i32,
    activity_factor: f64,
    injury_factor: f64,
}

/// Run the full assessment for one patient
pub fn calculate(input: &PatientInput, options: &CalculationOptions) -> EngineResult<DerivedMetrics> {
    // Required fields
    let weight_kg = require_positive(input.weight_kg, "weight_kg")?;
    let height_cm = require_positive(input.height_cm, "height_cm")?;
    let waist_cm = require_positive(input.waist_cm, "waist_cm")?;
    require_positive(input.wrist_cm, "wrist_cm")?;

    let energy_inputs = if options.compute_energy {
        Some(EnergyInputs {
            sex: input.sex.ok_or(EngineError::MissingField { field: "sex" })?,
            age_years: require_positive_int(input.age_years, "age_years")?,
            activity_factor: require_positive(input.activity_factor, "activity_factor")?,
            injury_factor: optional_positive(input.injury_factor, "injury_factor")?.unwrap_or(1.0),
        })
    } else {
        None
    };

    let energy_target_override = optional_positive(input.energy_target_kcal, "energy_target_kcal")?;
    let macro_percent = input.macro_percent.unwrap_or_default();
    macro_percent.validate()?;

    // Ideal weight gates every dependent metric
    let ideal = resolve_ideal_weight(
        input.bone_frame(),
        input.ideal_weight_expression.as_deref(),
        input.ideal_weight_manual_kg,
    )?;

    // Anthropometry
    let ppi = calculate_ppi(weight_kg, ideal.kg)?;
    let ppi_category = classify_ppi(ppi);
    let bmi = calculate_bmi(weight_kg, height_cm)?;
    let bmi_category = classify_bmi(bmi, options.bmi_granularity);
    let frame = assess_frame(&FrameInput::from(input))?;
    let effective = select_effective_weight(weight_kg, ideal.kg, bmi, ppi);
    let practical_formula = calculate_practical_formula(ppi, weight_kg, effective.weight_kg);
    let waist_to_height = calculate_waist_to_height(waist_cm, height_cm)?;

    // Energy
    let energy = energy_inputs.map(|e| {
        let bmr = calculate_bmr(options.bmr_equation, effective.weight_kg, height_cm, e.age_years, e.sex);
        EnergyMetrics {
            bmr_equation: options.bmr_equation,
            bmr,
            activity_factor: e.activity_factor,
            injury_factor: e.injury_factor,
            total_energy_expenditure: calculate_tee(bmr, e.activity_factor, e.injury_factor),
        }
    });

    // Only an implausible age drives the BMR to zero or below
    if let Some(e) = &energy {
        if !(e.total_energy_expenditure.is_finite() && e.total_energy_expenditure > 0.0) {
            return Err(EngineError::MissingField { field: "age_years" });
        }
    }

    let energy_target = energy_target_override.or(energy.map(|e| e.total_energy_expenditure));
    let adjusted_for_protein = match effective.basis {
        WeightBasis::Adjusted => Some(effective.adjusted_weight_kg),
        WeightBasis::Actual => None,
    };
    let macros = energy_target
        .map(|kcal| distribute(kcal, &macro_percent, Some(weight_kg), adjusted_for_protein))
        .transpose()?;

    Ok(DerivedMetrics {
        ideal_weight_kg: ideal.kg,
        ideal_weight_source: ideal.source,
        percent_ideal_weight: ppi,
        ppi_category,
        ppi_label: ppi_category.label().to_string(),
        ppi_status: ppi_category.status(),
        bmi,
        bmi_category,
        bmi_label: bmi_category.label().to_string(),
        bmi_status: bmi_category.status(),
        frame_ratio: frame.frame_ratio,
        frame_category: frame.frame_category,
        frame_label: frame.frame_label,
        weight_to_use_kg: effective.weight_kg,
        weight_basis: effective.basis,
        weight_basis_label: effective.basis.label().to_string(),
        adjusted_weight_kg: effective.adjusted_weight_kg,
        practical_formula,
        waist_to_height_ratio: waist_to_height.ratio,
        cardiovascular_risk: waist_to_height.cardiovascular_risk,
        energy,
        macros,
        options: *options,
    })
}

/// Body frame from height, wrist and sex alone
///
/// Usable before the rest of the assessment is filled in; without sex the
/// category is `undetermined`.
pub fn assess_frame(input: &FrameInput) -> EngineResult<FrameAssessment> {
    let height_cm = require_positive(input.height_cm, "height_cm")?;
    let wrist_cm = require_positive(input.wrist_cm, "wrist_cm")?;
    let frame_ratio = calculate_frame_ratio(height_cm, wrist_cm)?;
    let frame_category = classify_frame(frame_ratio, input.sex);
    Ok(FrameAssessment {
        frame_ratio,
        frame_category,
        frame_label: frame_category.label().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_metrics::{
        BmiCategory, BmiGranularity, BmrEquation, FrameCategory, IdealWeightSource, NutritionalStatus, PpiCategory,
    };
    use proptest::prelude::*;
    use rstest::rstest;

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

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_reference_patient() {
        let m = calculate(&reference_patient(), &CalculationOptions::default()).unwrap();

        assert!(approx(m.ideal_weight_kg, 75.6, 1e-9));
        assert_eq!(m.ideal_weight_source, IdealWeightSource::BoneFrame);
        assert!(approx(m.percent_ideal_weight, 94.18, 0.01));
        assert_eq!(m.ppi_category, PpiCategory::Normal);
        assert!(approx(m.bmi, 22.22, 0.01));
        assert_eq!(m.bmi_category, BmiCategory::Normal);
        assert!(approx(m.frame_ratio, 9.94, 0.01));
        assert_eq!(m.frame_category, FrameCategory::Medium);
        assert_eq!(m.weight_basis, WeightBasis::Actual);
        assert_eq!(m.weight_to_use_kg, 71.2);
        assert!(approx(m.waist_to_height_ratio, 0.559, 0.001));
        assert!(m.cardiovascular_risk);
        assert!(approx(m.practical_formula.kcal, 2136.0, 1e-9));

        let energy = m.energy.unwrap();
        assert!(approx(energy.bmr, 1737.97, 1e-6));
        assert_eq!(energy.injury_factor, 1.0);
        assert!(approx(energy.total_energy_expenditure, 1737.97 * 1.2, 1e-6));

        let macros = m.macros.unwrap();
        assert!(approx(macros.energy_kcal, energy.total_energy_expenditure, 1e-9));
        assert_eq!(macros.protein_g_per_kg_adjusted, None);
        assert!(macros.protein_g_per_kg_actual.is_some());
    }

    #[test]
    fn test_overweight_patient_uses_adjusted_weight() {
        let input = PatientInput {
            weight_kg: Some(95.0),
            ..reference_patient()
        };
        let m = calculate(&input, &CalculationOptions::default()).unwrap();

        assert!(approx(m.bmi, 29.65, 0.01));
        assert_eq!(m.bmi_category, BmiCategory::Overweight);
        assert!(approx(m.percent_ideal_weight, 125.66, 0.01));
        assert_eq!(m.ppi_category, PpiCategory::ObesityI);
        assert_eq!(m.ppi_status, NutritionalStatus::Overweight);
        assert_eq!(m.weight_basis, WeightBasis::Adjusted);
        assert!(approx(m.weight_to_use_kg, 80.45, 1e-9));
        assert!(approx(m.practical_formula.weight_kg, 80.45, 1e-9));
        assert_eq!(m.practical_formula.kcal_per_kg, 25.0);

        let macros = m.macros.unwrap();
        assert!(macros.protein_g_per_kg_adjusted.is_some());
    }

    #[test]
    fn test_manual_ideal_weight_overrides_bone_frame() {
        let input = PatientInput {
            ideal_weight_manual_kg: Some(70.0),
            ..reference_patient()
        };
        let m = calculate(&input, &CalculationOptions::default()).unwrap();
        assert_eq!(m.ideal_weight_kg, 70.0);
        assert_eq!(m.ideal_weight_source, IdealWeightSource::Manual);
    }

    #[test]
    fn test_expression_replaces_bone_frame() {
        let input = PatientInput {
            ideal_weight_expression: Some("(70 + 80) / 2".to_string()),
            ..reference_patient()
        };
        let m = calculate(&input, &CalculationOptions::default()).unwrap();
        assert_eq!(m.ideal_weight_kg, 75.0);
        assert_eq!(m.ideal_weight_source, IdealWeightSource::Expression);
    }

    #[test]
    fn test_missing_ideal_weight_fails() {
        let input = PatientInput {
            bone_frame_z: Some(0.0),
            ..reference_patient()
        };
        assert_eq!(
            calculate(&input, &CalculationOptions::default()),
            Err(EngineError::InvalidIdealWeight)
        );
    }

    #[test]
    fn test_invalid_expression_fails() {
        let input = PatientInput {
            ideal_weight_expression: Some("70 +".to_string()),
            ..reference_patient()
        };
        let err = calculate(&input, &CalculationOptions::default()).unwrap_err();
        assert_eq!(err.code(), "INVALID_EXPRESSION");
    }

    #[rstest]
    #[case::weight(PatientInput { weight_kg: None, ..reference_patient() }, "weight_kg")]
    #[case::height(PatientInput { height_cm: Some(0.0), ..reference_patient() }, "height_cm")]
    #[case::waist(PatientInput { waist_cm: Some(-1.0), ..reference_patient() }, "waist_cm")]
    #[case::wrist(PatientInput { wrist_cm: None, ..reference_patient() }, "wrist_cm")]
    #[case::sex(PatientInput { sex: None, ..reference_patient() }, "sex")]
    #[case::age(PatientInput { age_years: Some(0), ..reference_patient() }, "age_years")]
    #[case::activity(PatientInput { activity_factor: None, ..reference_patient() }, "activity_factor")]
    #[case::injury(PatientInput { injury_factor: Some(0.0), ..reference_patient() }, "injury_factor")]
    fn test_missing_field_is_named(#[case] input: PatientInput, #[case] field: &'static str) {
        assert_eq!(
            calculate(&input, &CalculationOptions::default()),
            Err(EngineError::MissingField { field })
        );
    }

    #[test]
    fn test_implausible_age_is_named() {
        let input = PatientInput {
            age_years: Some(500),
            ..reference_patient()
        };
        assert_eq!(
            calculate(&input, &CalculationOptions::default()),
            Err(EngineError::MissingField { field: "age_years" })
        );
    }

    #[rstest]
    #[case(Some(BiologicalSex::Male), FrameCategory::Medium)]
    #[case(Some(BiologicalSex::Female), FrameCategory::Large)]
    #[case(None, FrameCategory::Undetermined)]
    fn test_assess_frame(#[case] sex: Option<BiologicalSex>, #[case] expected: FrameCategory) {
        let frame = assess_frame(&FrameInput {
            height_cm: Some(179.0),
            wrist_cm: Some(18.0),
            sex,
        })
        .unwrap();
        assert!(approx(frame.frame_ratio, 9.944, 0.001));
        assert_eq!(frame.frame_category, expected);
        assert_eq!(frame.frame_label, expected.label());
    }

    #[test]
    fn test_assess_frame_names_missing_input() {
        let input = FrameInput {
            height_cm: Some(179.0),
            wrist_cm: Some(f64::NAN),
            sex: None,
        };
        assert_eq!(assess_frame(&input), Err(EngineError::MissingField { field: "wrist_cm" }));
    }

    #[test]
    fn test_missing_field_reported_before_ideal_weight() {
        let input = PatientInput {
            weight_kg: None,
            bone_frame_z: Some(0.0),
            ..reference_patient()
        };
        assert_eq!(
            calculate(&input, &CalculationOptions::default()),
            Err(EngineError::MissingField { field: "weight_kg" })
        );
    }

    #[test]
    fn test_anthropometry_only() {
        let input = PatientInput {
            sex: None,
            age_years: None,
            activity_factor: None,
            ..reference_patient()
        };
        let options = CalculationOptions {
            compute_energy: false,
            ..Default::default()
        };
        let m = calculate(&input, &options).unwrap();
        assert_eq!(m.frame_category, FrameCategory::Undetermined);
        assert!(m.energy.is_none());
        assert!(m.macros.is_none());
    }

    #[test]
    fn test_energy_target_override_drives_macros() {
        let input = PatientInput {
            energy_target_kcal: Some(1800.0),
            ..reference_patient()
        };
        let m = calculate(&input, &CalculationOptions::default()).unwrap();
        assert_eq!(m.macros.unwrap().energy_kcal, 1800.0);
    }

    #[test]
    fn test_strategies_are_applied() {
        let input = PatientInput {
            weight_kg: Some(120.0),
            ..reference_patient()
        };
        let options = CalculationOptions {
            bmi_granularity: BmiGranularity::Coarse,
            bmr_equation: BmrEquation::MifflinStJeor,
            compute_energy: true,
        };
        let m = calculate(&input, &options).unwrap();
        assert_eq!(m.bmi_category, BmiCategory::Obesity);
        assert_eq!(m.energy.unwrap().bmr_equation, BmrEquation::MifflinStJeor);
        assert_eq!(m.options, options);
    }

    #[test]
    fn test_output_serializes_snake_case() {
        let m = calculate(&reference_patient(), &CalculationOptions::default()).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["ppi_category"], "normal");
        assert_eq!(json["ideal_weight_source"], "bone_frame");
        assert_eq!(json["options"]["bmr_equation"], "harris_benedict");
        assert!(json["energy"]["total_energy_expenditure"].is_number());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: any valid input yields a positive ideal weight and the
        /// effective weight follows the BMI/PPI rule
        #[test]
        fn prop_valid_inputs_calculate(
            weight in 30.0f64..200.0,
            height in 140.0f64..210.0,
            ideal in 40.0f64..100.0,
        ) {
            let input = PatientInput {
                weight_kg: Some(weight),
                height_cm: Some(height),
                ideal_weight_manual_kg: Some(ideal),
                ..reference_patient()
            };
            let m = calculate(&input, &CalculationOptions::default()).unwrap();
            prop_assert!(m.ideal_weight_kg > 0.0);
            let adjusted = m.bmi >= 25.0 || m.percent_ideal_weight >= 110.0;
            prop_assert_eq!(m.weight_basis == WeightBasis::Adjusted, adjusted);
        }
    }
}
