//! AKICS preoperative acute kidney injury score.
//!
//! Developed for cardiac surgery; the non-cardiac adaptation uses procedure
//! complexity as a proxy for bypass-related risk.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{check_range, flag, fold, ScoringResult, ValidationError};
use crate::models::{Instrument, RiskCategory, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardiacSurgeryType {
    Coronary,
    Valve,
    Combined,
    NonCardiac,
}

impl FromStr for CardiacSurgeryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).replace([' ', '-'], "_").as_str() {
            "coronary" | "coronariana" | "cabg" => Ok(CardiacSurgeryType::Coronary),
            "valve" | "valvular" | "valvar" => Ok(CardiacSurgeryType::Valve),
            "combined" | "combinada" => Ok(CardiacSurgeryType::Combined),
            "non_cardiac" | "noncardiac" | "nao_cardiaca" => Ok(CardiacSurgeryType::NonCardiac),
            _ => Err(ValidationError::InvalidChoice {
                field: "surgery type",
                value: s.to_string(),
                expected: "coronary, valve, combined, non_cardiac",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

impl FromStr for Complexity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "low" | "baixa" => Ok(Complexity::Low),
            "medium" | "media" => Ok(Complexity::Medium),
            "high" | "alta" => Ok(Complexity::High),
            _ => Err(ValidationError::InvalidChoice {
                field: "non-cardiac complexity",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AkicsInputs {
    pub age: i32,
    pub female: bool,
    pub heart_failure: bool,
    pub hypertension: bool,
    pub emergency: bool,
    pub surgery_type: CardiacSurgeryType,
    /// mg/dL
    pub creatinine_mg_dl: f64,
    /// Only read when `surgery_type` is non-cardiac; defaults to low
    #[serde(default)]
    pub noncardiac_complexity: Option<Complexity>,
}

fn stratify(points: f64) -> (RiskCategory, f64) {
    if points <= 2.0 {
        (RiskCategory::VeryLow, 2.0)
    } else if points <= 5.0 {
        (RiskCategory::Low, 8.0)
    } else if points <= 8.0 {
        (RiskCategory::Moderate, 18.0)
    } else if points <= 13.0 {
        (RiskCategory::High, 35.0)
    } else {
        (RiskCategory::VeryHigh, 50.0)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn akics_score(inputs: &AkicsInputs) -> ScoringResult<ScoreResult> {
    check_range("age", f64::from(inputs.age), 0.0, 120.0)?;
    check_range("creatinine", inputs.creatinine_mg_dl, 0.0, 20.0)?;

    let creatinine = inputs.creatinine_mg_dl;
    let mut breakdown = vec![
        ("age/10", f64::from(inputs.age) / 10.0),
        ("female_sex", flag(inputs.female, 1.0)),
        ("heart_failure", flag(inputs.heart_failure, 1.0)),
        ("hypertension", flag(inputs.hypertension, 1.0)),
        ("emergency", flag(inputs.emergency, 2.0)),
        ("valve_surgery", flag(inputs.surgery_type == CardiacSurgeryType::Valve, 1.0)),
        ("combined_surgery", flag(inputs.surgery_type == CardiacSurgeryType::Combined, 2.0)),
        ("creatinine_1.2_2.0", flag((1.2..=2.0).contains(&creatinine), 2.0)),
        ("creatinine_gt_2.0", flag(creatinine > 2.0, 5.0)),
    ];

    if inputs.surgery_type == CardiacSurgeryType::NonCardiac {
        breakdown.push(match inputs.noncardiac_complexity.unwrap_or_default() {
            Complexity::High => ("noncardiac_complexity_high", 1.0),
            Complexity::Medium => ("noncardiac_complexity_medium", 0.5),
            Complexity::Low => ("noncardiac_complexity_low", 0.0),
        });
    }

    let points: f64 = breakdown.iter().map(|(_, w)| w).sum();
    let (category, probability) = stratify(points);

    let mut result = ScoreResult::new(Instrument::Akics, round2(points), category);
    result.breakdown = breakdown
        .into_iter()
        .map(|(name, weight)| (name.to_string(), round2(weight)))
        .collect();
    result.risk_percent = Some(probability);
    result.interpretation = "Preoperative AKICS estimates the risk of acute kidney injury after cardiac \
        surgery from age, comorbidities, urgency, surgical type and creatinine. The non-cardiac \
        adaptation uses procedure complexity as a proxy."
        .to_string();
    result.recommendations = Some(
        "Optimize hemodynamics and renal perfusion, avoid nephrotoxins, balance fluids and consider \
         close monitoring in patients at risk."
            .to_string(),
    );
    result.references = vec![
        "Palomba H et al. Acute kidney injury prediction following elective cardiac surgery: AKICS Score. Kidney Int. 2007;72(5):624-631.".to_string(),
    ];
    Ok(result)
}
