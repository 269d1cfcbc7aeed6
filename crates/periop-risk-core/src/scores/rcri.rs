//! Revised Cardiac Risk Index (Lee, 1999).

use serde::{Deserialize, Serialize};

use super::flag;
use crate::models::{Instrument, RiskCategory, ScoreResult};

/// The six RCRI factors, one point each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcriFactors {
    /// Intraperitoneal, intrathoracic or suprainguinal vascular surgery
    pub high_risk_surgery: bool,
    pub ischemic_heart_disease: bool,
    pub congestive_heart_failure: bool,
    /// Prior stroke or TIA
    pub cerebrovascular_disease: bool,
    pub insulin_treated_diabetes: bool,
    /// Preoperative serum creatinine > 2.0 mg/dL
    pub creatinine_gt_2mg_dl: bool,
}

/// Class, major cardiac event rate (%) and category for an RCRI total.
fn stratify(score: u8) -> (&'static str, f64, RiskCategory) {
    match score {
        0 => ("Class I", 0.4, RiskCategory::Low),
        1 => ("Class II", 0.9, RiskCategory::Intermediate),
        2 => ("Class III", 7.0, RiskCategory::Intermediate),
        _ => ("Class IV", 11.0, RiskCategory::High),
    }
}

pub fn rcri_score(factors: &RcriFactors) -> ScoreResult {
    let items = [
        ("high_risk_surgery", factors.high_risk_surgery),
        ("ischemic_heart_disease", factors.ischemic_heart_disease),
        ("congestive_heart_failure", factors.congestive_heart_failure),
        ("cerebrovascular_disease", factors.cerebrovascular_disease),
        ("insulin_treated_diabetes", factors.insulin_treated_diabetes),
        ("creatinine_gt_2mg_dl", factors.creatinine_gt_2mg_dl),
    ];

    let score = items.iter().filter(|(_, present)| *present).count() as u8;
    let (class, risk_pct, category) = stratify(score);

    let mut result = ScoreResult::new(Instrument::Rcri, f64::from(score), category);
    for (name, present) in items {
        result.breakdown.insert(name.to_string(), flag(present, 1.0));
    }
    result.class_label = Some(class.to_string());
    result.risk_percent = Some(risk_pct);
    result.interpretation = "RCRI estimates the risk of major cardiac events in noncardiac surgery. \
        The score is the sum of six 1-point factors."
        .to_string();
    result.recommendations = Some(
        "Optimize comorbidities with tight glycemic and blood pressure control; for intermediate or \
         high risk consider further stratification (functional assessment, echocardiography when \
         indicated) and multidisciplinary discussion."
            .to_string(),
    );
    result.references = vec![
        "Lee TH et al. Circulation. 1999;100(10):1043-1049.".to_string(),
        "ACC/AHA perioperative guidelines.".to_string(),
    ];
    result
}
