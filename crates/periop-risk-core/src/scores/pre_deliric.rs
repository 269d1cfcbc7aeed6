//! PRE-DELIRIC ICU delirium prediction, adapted to perioperative ICU admission.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{check_range, flag, fold, ScoringResult, ValidationError};
use crate::models::{Instrument, RiskCategory, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionGroup {
    Medical,
    Surgical,
    Trauma,
    Neurological,
}

impl AdmissionGroup {
    fn points(&self) -> f64 {
        match self {
            AdmissionGroup::Medical => 0.0,
            AdmissionGroup::Surgical => 1.0,
            AdmissionGroup::Trauma => 2.0,
            AdmissionGroup::Neurological => 5.0,
        }
    }
}

impl FromStr for AdmissionGroup {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "medical" | "clinico" => Ok(AdmissionGroup::Medical),
            "surgical" | "cirurgico" => Ok(AdmissionGroup::Surgical),
            "trauma" => Ok(AdmissionGroup::Trauma),
            "neuro" | "neurological" | "neurosurgery" | "neurocirurgia" => {
                Ok(AdmissionGroup::Neurological)
            }
            _ => Err(ValidationError::InvalidChoice {
                field: "admission group",
                value: s.to_string(),
                expected: "medical, surgical, trauma, neurological",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreDeliricInputs {
    pub age: i32,
    pub apache_ii: f64,
    pub admission_group: AdmissionGroup,
    pub coma: bool,
    pub infection: bool,
    pub ph: f64,
    /// Recorded for context; acidosis is judged on pH alone
    #[serde(default)]
    pub hco3: Option<f64>,
    pub sedatives: bool,
    /// Morphine or equivalent opioid use
    pub opioids: bool,
    /// mg/dL
    pub urea_mg_dl: f64,
    /// mg/dL
    pub creatinine_mg_dl: f64,
}

fn age_points(age: i32) -> f64 {
    match age {
        a if a >= 80 => 6.0,
        a if a >= 70 => 5.0,
        a if a >= 60 => 2.0,
        a if a >= 50 => 1.0,
        _ => 0.0,
    }
}

fn apache_points(apache: f64) -> f64 {
    if apache >= 20.0 {
        5.0
    } else if apache >= 15.0 {
        3.0
    } else if apache >= 10.0 {
        2.0
    } else {
        0.0
    }
}

fn ratio_points(ratio: f64) -> f64 {
    if ratio >= 10.0 {
        2.0
    } else if ratio >= 5.0 {
        1.0
    } else {
        0.0
    }
}

fn stratify(total: f64) -> (RiskCategory, f64) {
    if total <= 4.0 {
        (RiskCategory::VeryLow, 5.0)
    } else if total <= 9.0 {
        (RiskCategory::Low, 15.0)
    } else if total <= 15.0 {
        (RiskCategory::Moderate, 35.0)
    } else {
        (RiskCategory::High, 50.0)
    }
}

fn validate(inputs: &PreDeliricInputs) -> ScoringResult<()> {
    check_range("age", f64::from(inputs.age), 0.0, 120.0)?;
    check_range("APACHE II", inputs.apache_ii, 0.0, 71.0)?;
    check_range("pH", inputs.ph, 6.8, 7.8)?;
    if !inputs.urea_mg_dl.is_finite() || inputs.urea_mg_dl < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "urea",
            value: inputs.urea_mg_dl,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    if !inputs.creatinine_mg_dl.is_finite() || inputs.creatinine_mg_dl <= 0.0 {
        return Err(ValidationError::NotAbove {
            field: "creatinine",
            value: inputs.creatinine_mg_dl,
            bound: 0.0,
        });
    }
    // A vanishing creatinine can still overflow the ratio
    let ratio = inputs.urea_mg_dl / inputs.creatinine_mg_dl;
    if !ratio.is_finite() {
        return Err(ValidationError::OutOfRange {
            field: "urea/creatinine ratio",
            value: ratio,
            min: 0.0,
            max: f64::MAX,
        });
    }
    Ok(())
}

pub fn pre_deliric_score(inputs: &PreDeliricInputs) -> ScoringResult<ScoreResult> {
    validate(inputs)?;

    let ratio = inputs.urea_mg_dl / inputs.creatinine_mg_dl;
    let breakdown = [
        ("age", age_points(inputs.age)),
        ("apache_ii", apache_points(inputs.apache_ii)),
        ("admission_group", inputs.admission_group.points()),
        ("coma", flag(inputs.coma, 4.0)),
        ("infection", flag(inputs.infection, 1.0)),
        ("acidosis", flag(inputs.ph < 7.35, 2.0)),
        ("sedatives", flag(inputs.sedatives, 1.0)),
        ("opioids", flag(inputs.opioids, 2.0)),
        ("urea_creatinine_ratio", ratio_points(ratio)),
    ];

    let total: f64 = breakdown.iter().map(|(_, w)| w).sum();
    let (category, probability) = stratify(total);

    let mut result = ScoreResult::new(Instrument::PreDeliric, total, category);
    result.breakdown = breakdown
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();
    result
        .derived
        .insert("urea_creatinine_ratio".to_string(), (ratio * 100.0).round() / 100.0);
    result.risk_percent = Some(probability);
    result.interpretation = "PRE-DELIRIC estimates the risk of ICU delirium in the first 24 hours. This \
        adapted calculation uses common perioperative variables (age, APACHE II, admission group, coma, \
        infection, acidosis, sedatives/opioids and urea/creatinine ratio)."
        .to_string();
    result.recommendations = Some(
        "Implement preventive measures: reorientation, sleep hygiene, early mobilization, avoid \
         polypharmacy and excessive sedation."
            .to_string(),
    );
    result.references = vec![
        "van den Boogaard M et al. Development and validation of PRE-DELIRIC. BMJ. 2012;344:e420.".to_string(),
    ];
    Ok(result)
}
