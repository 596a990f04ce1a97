//! Report export service
//!
//! Renders one assessment as a single CSV document split into sections:
//! patient data, results, macro distribution, the developed-formula table
//! and the diet contribution. Numbers use the comma-decimal locale format,
//! so the document uses `;` as the field delimiter.

use crate::error::ApiError;
use chrono::{Local, NaiveDate};
use nutriweb_shared::developed_formula::{
    aggregate, DevelopedFormulaRow, DevelopedFormulaTotals, DietTargets, NutrientColumns,
};
use nutriweb_shared::locale::format_decimal;
use nutriweb_shared::{
    calculate, BiologicalSex, CalculationOptions, CalculationOptionsOverride, DerivedMetrics, MacroDistribution,
    PatientInput,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Export request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    pub patient: PatientInput,
    #[serde(default)]
    pub options: Option<CalculationOptionsOverride>,
    #[serde(default)]
    pub rows: Vec<DevelopedFormulaRow>,
}

const DEVELOPED_FORMULA_HEADER: [&str; 17] = [
    "Food",
    "Household serving",
    "Quantity",
    "Carbohydrate (g)",
    "Protein (g)",
    "HBV protein (g)",
    "Fat (g)",
    "Sodium (mg)",
    "Potassium (mg)",
    "Phosphorus (mg)",
    "Calcium (mg)",
    "Cholesterol (mg)",
    "Purines (mg)",
    "Water (ml)",
    "Saturated fat (g)",
    "Simple carbohydrate (g)",
    "Fiber (g)",
];

pub struct ExportService;

impl ExportService {
    /// Calculate and render the CSV report
    pub fn export_csv(defaults: &CalculationOptions, request: &ExportRequest, decimals: usize) -> Result<String, ApiError> {
        let options = defaults.with_overrides(request.options.as_ref());
        let metrics = calculate(&request.patient, &options)?;
        let totals = aggregate(&request.rows);
        let date = request.patient.date.unwrap_or_else(|| Local::now().date_naive());

        debug!(rows = totals.row_count, %date, "Rendering CSV report");

        let report = ReportWriter::new(decimals);
        report.render(&request.patient, date, &metrics, &request.rows, &totals)
    }
}

struct ReportWriter {
    decimals: usize,
}

impl ReportWriter {
    fn new(decimals: usize) -> Self {
        Self { decimals }
    }

    fn num(&self, value: f64) -> String {
        format_decimal(value, self.decimals)
    }

    fn render(
        &self,
        patient: &PatientInput,
        date: NaiveDate,
        metrics: &DerivedMetrics,
        rows: &[DevelopedFormulaRow],
        totals: &DevelopedFormulaTotals,
    ) -> Result<String, ApiError> {
        let mut records: Vec<Vec<String>> = Vec::new();

        self.patient_section(&mut records, patient, date);
        self.results_section(&mut records, metrics);
        if let Some(macros) = &metrics.macros {
            self.distribution_section(&mut records, macros);
        }
        self.developed_formula_section(&mut records, rows, totals);
        self.contribution_section(&mut records, metrics, totals);

        Self::to_csv(&records)
    }

    fn patient_section(&self, out: &mut Vec<Vec<String>>, patient: &PatientInput, date: NaiveDate) {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let measurement = |v: Option<f64>| v.map(|v| self.num(v)).unwrap_or_default();
        let sex = match patient.sex {
            Some(BiologicalSex::Male) => "Male",
            Some(BiologicalSex::Female) => "Female",
            None => "",
        };

        out.push(row(["Patient data"]));
        out.push(row(["Name".to_string(), text(&patient.patient_name)]));
        out.push(row(["Date".to_string(), date.format("%d/%m/%Y").to_string()]));
        out.push(row(["Medical diagnosis".to_string(), text(&patient.medical_diagnosis)]));
        out.push(row(["Nutritional diagnosis".to_string(), text(&patient.nutritional_diagnosis)]));
        out.push(row(["Weight (kg)".to_string(), measurement(patient.weight_kg)]));
        out.push(row(["Height (cm)".to_string(), measurement(patient.height_cm)]));
        out.push(row(["Sex".to_string(), sex.to_string()]));
        out.push(row([
            "Age (years)".to_string(),
            patient.age_years.map(|a| a.to_string()).unwrap_or_default(),
        ]));
        out.push(row(["Waist (cm)".to_string(), measurement(patient.waist_cm)]));
        out.push(row(["Wrist (cm)".to_string(), measurement(patient.wrist_cm)]));
    }

    fn results_section(&self, out: &mut Vec<Vec<String>>, m: &DerivedMetrics) {
        out.push(row(["Results", "Value", "Classification"]));
        out.push(row([
            "Ideal weight (kg)".to_string(),
            self.num(m.ideal_weight_kg),
            m.ideal_weight_source.label().to_string(),
        ]));
        out.push(row(["PPI (%)".to_string(), self.num(m.percent_ideal_weight), m.ppi_label.clone()]));
        out.push(row(["BMI".to_string(), self.num(m.bmi), m.bmi_label.clone()]));
        out.push(row(["Frame (height/wrist)".to_string(), self.num(m.frame_ratio), m.frame_label.clone()]));
        out.push(row([
            "Weight to use (kg)".to_string(),
            self.num(m.weight_to_use_kg),
            m.weight_basis_label.clone(),
        ]));
        out.push(row(["Adjusted weight (kg)".to_string(), self.num(m.adjusted_weight_kg)]));
        out.push(row([
            "Practical formula (kcal)".to_string(),
            self.num(m.practical_formula.kcal),
            format!("{} kcal/kg", self.num(m.practical_formula.kcal_per_kg)),
        ]));
        out.push(row([
            "Waist/height".to_string(),
            self.num(m.waist_to_height_ratio),
            if m.cardiovascular_risk {
                "Cardiovascular risk".to_string()
            } else {
                "No risk".to_string()
            },
        ]));
        if let Some(energy) = &m.energy {
            out.push(row([
                "BMR (kcal)".to_string(),
                self.num(energy.bmr),
                energy.bmr_equation.label().to_string(),
            ]));
            out.push(row([
                "TEE (kcal)".to_string(),
                self.num(energy.total_energy_expenditure),
                format!(
                    "activity {} x injury {}",
                    self.num(energy.activity_factor),
                    self.num(energy.injury_factor)
                ),
            ]));
        }
    }

    fn distribution_section(&self, out: &mut Vec<Vec<String>>, d: &MacroDistribution) {
        out.push(row(["Distribution", "%", "kcal", "g"]));
        for (name, amount) in [("Carbohydrate", &d.carb), ("Protein", &d.protein), ("Fat", &d.fat)] {
            out.push(row([
                name.to_string(),
                self.num(amount.percent),
                self.num(amount.kcal),
                self.num(amount.grams),
            ]));
        }
        out.push(row(["Total".to_string(), self.num(d.percent_sum), self.num(d.energy_kcal)]));
        out.push(row(["HBV protein 70% (g)".to_string(), self.num(d.high_biologic_value_protein_g)]));
        if let Some(v) = d.protein_g_per_kg_actual {
            out.push(row(["Protein g/kg actual weight".to_string(), self.num(v)]));
        }
        if let Some(v) = d.protein_g_per_kg_adjusted {
            out.push(row(["Protein g/kg adjusted weight".to_string(), self.num(v)]));
        }
    }

    fn nutrient_cells(&self, n: &NutrientColumns) -> Vec<String> {
        [
            n.carbohydrate_g,
            n.protein_g,
            n.high_biologic_value_protein_g,
            n.fat_g,
            n.sodium_mg,
            n.potassium_mg,
            n.phosphorus_mg,
            n.calcium_mg,
            n.cholesterol_mg,
            n.purines_mg,
            n.water_ml,
            n.saturated_fat_g,
            n.simple_carbohydrate_g,
            n.fiber_g,
        ]
        .iter()
        .map(|v| self.num(*v))
        .collect()
    }

    fn developed_formula_section(
        &self,
        out: &mut Vec<Vec<String>>,
        rows: &[DevelopedFormulaRow],
        totals: &DevelopedFormulaTotals,
    ) {
        out.push(row(["Developed formula"]));
        out.push(row(DEVELOPED_FORMULA_HEADER));
        for r in rows {
            let mut cells = vec![r.food.clone(), r.household_serving.clone(), self.num(r.quantity)];
            cells.extend(self.nutrient_cells(&r.nutrients));
            out.push(cells);
        }

        let mut total = vec!["Total".to_string(), String::new(), String::new()];
        total.extend(self.nutrient_cells(&totals.sums));
        out.push(total);

        let k = &totals.kcal;
        let empty = String::new;
        out.push(vec![
            "Kcal".to_string(),
            empty(),
            empty(),
            self.num(k.carbohydrate),
            self.num(k.protein),
            empty(),
            self.num(k.fat),
            empty(),
            empty(),
            empty(),
            empty(),
            empty(),
            empty(),
            empty(),
            self.num(k.saturated_fat),
            self.num(k.simple_carbohydrate),
            empty(),
        ]);
    }

    fn contribution_section(&self, out: &mut Vec<Vec<String>>, m: &DerivedMetrics, totals: &DevelopedFormulaTotals) {
        let targets = m.macros.as_ref().map(DietTargets::from_distribution);
        let target = |f: fn(&DietTargets) -> f64| targets.as_ref().map(|t| self.num(f(t))).unwrap_or_default();

        out.push(row(["Diet contribution", "Real", "Target"]));
        out.push(row([
            "Energy (kcal)".to_string(),
            self.num(totals.real_energy_kcal),
            target(|t| t.energy_kcal),
        ]));
        out.push(row([
            "Carbohydrate (g)".to_string(),
            self.num(totals.sums.carbohydrate_g),
            target(|t| t.carbohydrate_g),
        ]));
        out.push(row([
            "Protein (g)".to_string(),
            self.num(totals.sums.protein_g),
            target(|t| t.protein_g),
        ]));
        out.push(row(["Fat (g)".to_string(), self.num(totals.sums.fat_g), target(|t| t.fat_g)]));
        out.push(row([
            "HBV protein (g)".to_string(),
            self.num(totals.sums.high_biologic_value_protein_g),
            target(|t| t.high_biologic_value_protein_g),
        ]));
        out.push(row([
            "Saturated fat (g)".to_string(),
            self.num(totals.sums.saturated_fat_g),
            target(|t| t.saturated_fat_max_g),
        ]));
        out.push(row([
            "Simple carbohydrate (g)".to_string(),
            self.num(totals.sums.simple_carbohydrate_g),
            target(|t| t.simple_carbohydrate_max_g),
        ]));
        out.push(row(["Saturated fat (%)".to_string(), self.num(totals.saturated_fat_percent)]));
        out.push(row([
            "Simple carbohydrate (%)".to_string(),
            self.num(totals.simple_carbohydrate_percent),
        ]));
        out.push(row([
            "HBV protein (%)".to_string(),
            self.num(totals.high_biologic_value_protein_percent),
        ]));
    }

    /// Convert records to a CSV string
    fn to_csv(records: &[Vec<String>]) -> Result<String, ApiError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_writer(vec![]);
        for record in records {
            wtr.write_record(record)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV write error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ApiError::Internal(anyhow::anyhow!("UTF-8 error: {}", e)))
    }
}

fn row<S: ToString, const N: usize>(cells: [S; N]) -> Vec<String> {
    cells.iter().map(ToString::to_string).collect()
}
