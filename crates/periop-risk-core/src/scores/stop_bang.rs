//! STOP-Bang obstructive sleep apnea screen.

use serde::{Deserialize, Serialize};

use super::flag;
use crate::models::{Instrument, RiskCategory, ScoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopBangAnswers {
    pub snoring: bool,
    pub tired: bool,
    pub observed_apnea: bool,
    pub high_blood_pressure: bool,
    pub bmi_over_35: bool,
    pub age_over_50: bool,
    pub neck_over_40cm: bool,
    pub male: bool,
}

pub fn stop_bang_score(answers: &StopBangAnswers) -> ScoreResult {
    let items = [
        ("snoring", answers.snoring),
        ("tired", answers.tired),
        ("observed_apnea", answers.observed_apnea),
        ("high_blood_pressure", answers.high_blood_pressure),
        ("bmi_over_35", answers.bmi_over_35),
        ("age_over_50", answers.age_over_50),
        ("neck_over_40cm", answers.neck_over_40cm),
        ("male", answers.male),
    ];
    let score = items.iter().filter(|(_, yes)| *yes).count();
    let category = match score {
        0..=2 => RiskCategory::Low,
        3..=4 => RiskCategory::Intermediate,
        _ => RiskCategory::High,
    };

    let mut result = ScoreResult::new(Instrument::StopBang, score as f64, category);
    result.breakdown = items
        .into_iter()
        .map(|(name, yes)| (name.to_string(), flag(yes, 1.0)))
        .collect();
    result.interpretation = "STOP-Bang screens for obstructive sleep apnea; higher totals call for \
        airway planning and cautious opioid use."
        .to_string();
    result.references = vec![
        "Chung F et al. STOP-Bang questionnaire: a tool to screen patients for obstructive sleep apnea. Anesthesiology. 2008;108(5):812-821.".to_string(),
    ];
    result
}
