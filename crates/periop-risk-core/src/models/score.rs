//! Score result models shared by every instrument.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scoring instruments supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Asa,
    Rcri,
    Ariscat,
    Nsqip,
    Akics,
    PreDeliric,
    StopBang,
}

impl Instrument {
    /// Stable identifier, also used as the key inside a score set.
    pub fn id(&self) -> &'static str {
        match self {
            Instrument::Asa => "asa",
            Instrument::Rcri => "rcri",
            Instrument::Ariscat => "ariscat",
            Instrument::Nsqip => "nsqip",
            Instrument::Akics => "akics",
            Instrument::PreDeliric => "pre_deliric",
            Instrument::StopBang => "stop_bang",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Asa => "ASA Physical Status",
            Instrument::Rcri => "RCRI (Revised Cardiac Risk Index)",
            Instrument::Ariscat => "ARISCAT",
            Instrument::Nsqip => "NSQIP (heuristic proxy)",
            Instrument::Akics => "AKICS",
            Instrument::PreDeliric => "PRE-DELIRIC",
            Instrument::StopBang => "STOP-Bang",
        }
    }
}

/// Qualitative risk tier, ordered from lowest to highest.
///
/// `NotApplicable` and `Unstratified` sort last and never take part in
/// threshold banding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    VeryLow,
    Low,
    Intermediate,
    Moderate,
    High,
    VeryHigh,
    NotApplicable,
    Unstratified,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::VeryLow => "Very low",
            RiskCategory::Low => "Low",
            RiskCategory::Intermediate => "Intermediate",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
            RiskCategory::VeryHigh => "Very high",
            RiskCategory::NotApplicable => "N/A",
            RiskCategory::Unstratified => "Not stratified",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one scoring instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResult {
    pub instrument: Instrument,
    /// Point total (or ordinal class for ASA)
    pub score: f64,
    pub category: RiskCategory,
    /// Instrument-specific class label ("Class II", "III-E")
    pub class_label: Option<String>,
    /// Qualitative annotation on top of the category
    pub annotation: Option<String>,
    /// Estimated event probability in percent
    pub risk_percent: Option<f64>,
    /// Factor name → weight applied
    pub breakdown: BTreeMap<String, f64>,
    /// Derived quantities that are not weights (estimates, ratios)
    pub derived: BTreeMap<String, f64>,
    pub description: Option<String>,
    pub interpretation: String,
    pub recommendations: Option<String>,
    pub references: Vec<String>,
}

impl ScoreResult {
    /// Start a result for `instrument` with only the mandatory fields set.
    pub fn new(instrument: Instrument, score: f64, category: RiskCategory) -> Self {
        Self {
            instrument,
            score,
            category,
            class_label: None,
            annotation: None,
            risk_percent: None,
            breakdown: BTreeMap::new(),
            derived: BTreeMap::new(),
            description: None,
            interpretation: String::new(),
            recommendations: None,
            references: Vec::new(),
        }
    }

    /// Category label including the annotation, e.g. "Low (increased by emergency)".
    pub fn category_text(&self) -> String {
        match &self.annotation {
            Some(note) => format!("{} ({})", self.category, note),
            None => self.category.to_string(),
        }
    }

    /// Sum of all weights in the breakdown.
    pub fn breakdown_total(&self) -> f64 {
        self.breakdown.values().sum()
    }
}
