//! ARISCAT postoperative pulmonary complication score (Canet, 2010).
//!
//! Age, incision site and duration are banded: within each band only the
//! highest applicable weight counts, never the sum.

use serde::{Deserialize, Serialize};

use super::flag;
use crate::models::{Instrument, RiskCategory, ScoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AriscatFactors {
    pub age_51_80: bool,
    pub age_gt_80: bool,
    /// Preoperative SpO2 ≤ 95 %
    pub spo2_le_95: bool,
    pub resp_infection_last_month: bool,
    /// Hb ≤ 10 g/dL
    pub anemia_hb_le_10: bool,
    pub incision_upper_abdominal: bool,
    pub incision_intrathoracic: bool,
    pub duration_2_to_3h: bool,
    pub duration_gt_3h: bool,
    pub emergency_surgery: bool,
}

const AGE_51_80: f64 = 3.0;
const AGE_GT_80: f64 = 16.0;
const SPO2_LE_95: f64 = 8.0;
const RESP_INFECTION: f64 = 17.0;
const ANEMIA: f64 = 11.0;
const INCISION_UPPER_ABDOMINAL: f64 = 15.0;
const INCISION_INTRATHORACIC: f64 = 24.0;
const DURATION_2_TO_3H: f64 = 16.0;
const DURATION_GT_3H: f64 = 23.0;
const EMERGENCY: f64 = 8.0;

/// Highest weight among the flags that are set, or 0.
fn highest(options: &[(bool, f64)]) -> f64 {
    options
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| *weight)
        .fold(0.0, f64::max)
}

fn stratify(total: f64) -> (RiskCategory, f64) {
    if total < 26.0 {
        (RiskCategory::Low, 1.6)
    } else if total < 45.0 {
        (RiskCategory::Intermediate, 13.3)
    } else {
        (RiskCategory::High, 42.1)
    }
}

pub fn ariscat_score(factors: &AriscatFactors) -> ScoreResult {
    let age_51_80 = flag(factors.age_51_80 && !factors.age_gt_80, AGE_51_80);
    let age_gt_80 = flag(factors.age_gt_80, AGE_GT_80);
    let incision = highest(&[
        (factors.incision_intrathoracic, INCISION_INTRATHORACIC),
        (factors.incision_upper_abdominal, INCISION_UPPER_ABDOMINAL),
    ]);
    let duration = highest(&[
        (factors.duration_gt_3h, DURATION_GT_3H),
        (factors.duration_2_to_3h, DURATION_2_TO_3H),
    ]);

    let breakdown = [
        ("age_51_80", age_51_80),
        ("age_gt_80", age_gt_80),
        ("spo2_le_95", flag(factors.spo2_le_95, SPO2_LE_95)),
        ("resp_infection_last_month", flag(factors.resp_infection_last_month, RESP_INFECTION)),
        ("anemia_hb_le_10", flag(factors.anemia_hb_le_10, ANEMIA)),
        ("incision", incision),
        ("duration", duration),
        ("emergency_surgery", flag(factors.emergency_surgery, EMERGENCY)),
    ];

    let total: f64 = breakdown.iter().map(|(_, w)| w).sum();
    let (category, probability) = stratify(total);

    let mut result = ScoreResult::new(Instrument::Ariscat, total, category);
    result.breakdown = breakdown
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();
    result.risk_percent = Some(probability);
    result.interpretation = "ARISCAT estimates the risk of postoperative pulmonary complications from \
        age, oxygenation, recent respiratory infection, anemia, incision site, duration and urgency."
        .to_string();
    result.references = vec![
        "Canet J et al. Prediction of postoperative pulmonary complications in a population-based surgical cohort. Anesthesiology. 2010;113(6):1338-1350.".to_string(),
    ];
    result
}
