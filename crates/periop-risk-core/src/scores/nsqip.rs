//! Heuristic NSQIP proxy.
//!
//! This is NOT the ACS-NSQIP Surgical Risk Calculator, whose model is
//! proprietary and CPT-based. It is a weighted sum turned into rough
//! percentages for triage and teaching. Inputs are taken as given; outputs
//! are clamped to plausible ranges instead.

use serde::{Deserialize, Serialize};

use super::{flag, fold};
use crate::models::{Instrument, RiskCategory, ScoreResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NsqipInputs {
    pub age: i32,
    pub sex: String,
    pub functional_status: String,
    pub emergency: bool,
    pub asa: String,
    pub diabetes: bool,
    pub hypertension: bool,
    pub copd: bool,
    pub heart_failure: bool,
    /// Free-text procedure description, matched by keyword
    pub procedure: String,
    /// %
    pub hematocrit: f64,
    /// mg/dL
    pub creatinine: f64,
    /// g/dL
    pub albumin: f64,
    /// 10³/µL
    pub platelets: f64,
}

/// Procedure categories, first match wins.
const PROCEDURE_CATEGORIES: &[(&str, &[&str], f64)] = &[
    ("cardiac", &["card", "coron", "valv"], 3.0),
    ("vascular", &["vascular", "aorta", "suprainguinal"], 2.5),
    ("thoracic", &["torac", "thorac", "pulmon", "lung", "esofag", "esophag", "mediast"], 2.0),
    ("abdominal", &["abdom", "colect", "gastrect", "hepatec"], 1.8),
    ("orthopedic", &["ortop", "orthop", "arthro", "quadril", "hip", "joelho", "knee"], 1.2),
];

/// Output name, multiplier on the base rate, clamp range.
const ESTIMATES: &[(&str, f64, f64, f64)] = &[
    ("mortality_30d_pct", 1.2, 0.1, 25.0),
    ("cardiac_complication_pct", 1.0, 0.1, 20.0),
    ("pneumonia_pct", 0.9, 0.1, 20.0),
    ("ssi_pct", 0.8, 0.1, 20.0),
    ("uti_pct", 0.6, 0.1, 15.0),
    ("venous_thromboembolism_pct", 0.7, 0.1, 10.0),
    ("renal_failure_pct", 0.9, 0.1, 15.0),
    ("readmission_pct", 1.1, 0.1, 25.0),
    ("reoperation_pct", 0.8, 0.1, 15.0),
];

fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

fn age_points(age: i32) -> f64 {
    if age >= 80 {
        3.0
    } else if age >= 70 {
        2.0
    } else if age >= 60 {
        1.0
    } else {
        0.0
    }
}

fn functional_points(status: &str) -> f64 {
    match fold(status).as_str() {
        "totally dependent" | "totalmente dependente" | "dependente total" => 3.0,
        "partially dependent" | "parcialmente dependente" | "dependente parcial" => 1.5,
        _ => 0.0,
    }
}

fn asa_points(asa: &str) -> f64 {
    match asa.trim().to_uppercase().as_str() {
        "II" => 0.5,
        "III" => 1.5,
        "IV" => 3.0,
        "V" => 5.0,
        _ => 0.0,
    }
}

fn procedure_points(procedure: &str) -> (Option<&'static str>, f64) {
    let proc = fold(procedure);
    PROCEDURE_CATEGORIES
        .iter()
        .find(|(_, keywords, _)| keywords.iter().any(|k| proc.contains(k)))
        .map(|(name, _, weight)| (Some(*name), *weight))
        .unwrap_or((None, 0.0))
}

pub fn nsqip_proxy(inputs: &NsqipInputs) -> ScoreResult {
    let sex = fold(&inputs.sex);
    let is_male = matches!(sex.as_str(), "male" | "m" | "masculino");
    let (procedure_category, procedure_weight) = procedure_points(&inputs.procedure);

    let breakdown = [
        ("age", age_points(inputs.age)),
        ("male_sex", flag(is_male, 0.3)),
        ("functional_status", functional_points(&inputs.functional_status)),
        ("emergency", flag(inputs.emergency, 2.5)),
        ("asa", asa_points(&inputs.asa)),
        ("diabetes", flag(inputs.diabetes, 0.5)),
        ("hypertension", flag(inputs.hypertension, 0.4)),
        ("copd", flag(inputs.copd, 0.8)),
        ("heart_failure", flag(inputs.heart_failure, 1.5)),
        ("procedure", procedure_weight),
        ("hematocrit_lt_30", flag(inputs.hematocrit < 30.0, 1.2)),
        ("creatinine_ge_1_5", flag(inputs.creatinine >= 1.5, 1.0)),
        ("albumin_lt_3_5", flag(inputs.albumin < 3.5, 1.3)),
        ("platelets_lt_150", flag(inputs.platelets < 150.0, 0.8)),
    ];

    let score: f64 = breakdown.iter().map(|(_, w)| w).sum();
    let base = (0.2 * score).max(0.5);

    let mut result = ScoreResult::new(Instrument::Nsqip, score, RiskCategory::Unstratified);
    result.breakdown = breakdown
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();
    for (name, multiplier, lo, hi) in ESTIMATES {
        result
            .derived
            .insert(name.to_string(), clamp(base * multiplier, *lo, *hi));
    }
    result.derived.insert(
        "length_of_stay_days".to_string(),
        clamp(1.0 + score * 0.6, 0.5, 30.0),
    );
    result.risk_percent = result.derived.get("mortality_30d_pct").copied();
    result.description = procedure_category.map(|c| format!("Procedure category: {c}"));
    result.interpretation = "Approximate perioperative risk estimates from NSQIP-inspired heuristics. \
        Use the official ACS-NSQIP calculator for definitive clinical decisions."
        .to_string();
    result.references = vec![
        "American College of Surgeons NSQIP Surgical Risk Calculator (official).".to_string(),
        "Bilimoria KY et al. Development and evaluation of the universal ACS NSQIP surgical risk calculator. J Am Coll Surg. 2013.".to_string(),
    ];
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> NsqipInputs {
        NsqipInputs {
            age: 40,
            sex: "female".into(),
            functional_status: "independent".into(),
            asa: "I".into(),
            procedure: "inguinal hernia repair".into(),
            hematocrit: 42.0,
            creatinine: 0.8,
            albumin: 4.2,
            platelets: 250.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_patient_hits_floors() {
        let result = nsqip_proxy(&healthy());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.category, RiskCategory::Unstratified);
        // base floors at 0.5
        assert!((result.derived["mortality_30d_pct"] - 0.6).abs() < 1e-9);
        assert!((result.derived["uti_pct"] - 0.3).abs() < 1e-9);
        assert_eq!(result.derived["length_of_stay_days"], 1.0);
        assert_eq!(result.derived.len(), 10);
    }

    #[test]
    fn test_first_procedure_match_wins() {
        // "cardiac" appears before "vascular" in the table
        assert_eq!(procedure_points("Cardiovascular bypass"), (Some("cardiac"), 3.0));
        assert_eq!(procedure_points("Colectomia"), (Some("abdominal"), 1.8));
        assert_eq!(procedure_points("Total knee arthroplasty"), (Some("orthopedic"), 1.2));
        assert_eq!(procedure_points("cataract"), (None, 0.0));
    }

    #[test]
    fn test_portuguese_inputs() {
        let inputs = NsqipInputs {
            sex: "Masculino".into(),
            functional_status: "Parcialmente dependente".into(),
            ..healthy()
        };
        let result = nsqip_proxy(&inputs);
        assert_eq!(result.breakdown["male_sex"], 0.3);
        assert_eq!(result.breakdown["functional_status"], 1.5);
    }

    #[test]
    fn test_outputs_are_clamped() {
        let inputs = NsqipInputs {
            age: 90,
            sex: "male".into(),
            functional_status: "totally dependent".into(),
            emergency: true,
            asa: "V".into(),
            diabetes: true,
            hypertension: true,
            copd: true,
            heart_failure: true,
            procedure: "aortic valve replacement".into(),
            hematocrit: 25.0,
            creatinine: 3.0,
            albumin: 2.0,
            platelets: 80.0,
        };
        let result = nsqip_proxy(&inputs);
        for (name, _, lo, hi) in ESTIMATES {
            let value = result.derived[*name];
            assert!(value >= *lo && value <= *hi, "{name} = {value}");
        }
        assert!(result.derived["length_of_stay_days"] <= 30.0);
    }

    #[test]
    fn test_unknown_asa_scores_zero() {
        assert_eq!(asa_points("VI"), 0.0);
        assert_eq!(asa_points("garbage"), 0.0);
        assert_eq!(asa_points(" iv "), 3.0);
    }
}
