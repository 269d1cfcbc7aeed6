//! ASA Physical Status classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ScoringResult, ValidationError};
use crate::models::{Instrument, RiskCategory, ScoreResult};

/// ASA physical status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsaClass {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl AsaClass {
    pub fn ordinal(&self) -> u8 {
        match self {
            AsaClass::I => 1,
            AsaClass::II => 2,
            AsaClass::III => 3,
            AsaClass::IV => 4,
            AsaClass::V => 5,
            AsaClass::VI => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AsaClass::I => "I",
            AsaClass::II => "II",
            AsaClass::III => "III",
            AsaClass::IV => "IV",
            AsaClass::V => "V",
            AsaClass::VI => "VI",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AsaClass::I => "ASA I - Healthy patient, no systemic disease.",
            AsaClass::II => "ASA II - Mild systemic disease without significant functional limitation.",
            AsaClass::III => "ASA III - Severe systemic disease with functional limitation.",
            AsaClass::IV => "ASA IV - Severe systemic disease that is a constant threat to life.",
            AsaClass::V => "ASA V - Moribund patient not expected to survive without the operation.",
            AsaClass::VI => "ASA VI - Declared brain-dead patient whose organs are being removed for donation.",
        }
    }

    /// Auxiliary qualitative tier. Not part of the official classification.
    pub fn base_risk(&self) -> RiskCategory {
        match self {
            AsaClass::I => RiskCategory::VeryLow,
            AsaClass::II => RiskCategory::Low,
            AsaClass::III => RiskCategory::Intermediate,
            AsaClass::IV => RiskCategory::High,
            AsaClass::V => RiskCategory::VeryHigh,
            AsaClass::VI => RiskCategory::NotApplicable,
        }
    }
}

impl fmt::Display for AsaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AsaClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "I" => Ok(AsaClass::I),
            "II" => Ok(AsaClass::II),
            "III" => Ok(AsaClass::III),
            "IV" => Ok(AsaClass::IV),
            "V" => Ok(AsaClass::V),
            "VI" => Ok(AsaClass::VI),
            _ => Err(ValidationError::InvalidChoice {
                field: "ASA class",
                value: s.to_string(),
                expected: "I, II, III, IV, V, VI",
            }),
        }
    }
}

/// Classify from free-text class input ("ii", " III ").
pub fn classify_asa(class: &str, emergency: bool) -> ScoringResult<ScoreResult> {
    let class: AsaClass = class.parse()?;
    Ok(asa_score(class, emergency))
}

/// Classify an already parsed ASA class.
pub fn asa_score(class: AsaClass, emergency: bool) -> ScoreResult {
    let mut result = ScoreResult::new(
        Instrument::Asa,
        f64::from(class.ordinal()),
        class.base_risk(),
    );

    result.class_label = Some(if emergency {
        format!("{class}-E")
    } else {
        class.to_string()
    });
    if emergency && class != AsaClass::VI {
        result.annotation = Some("increased by emergency".to_string());
    }
    result.description = Some(class.description().to_string());
    result.interpretation = "The ASA classification describes the preoperative physical status. \
        The E modifier marks an emergency procedure."
        .to_string();
    result.references = vec![
        "ASA Physical Status Classification System (American Society of Anesthesiologists).".to_string(),
        "Daabiss M. American Society of Anaesthesiologists physical status classification. Indian J Anaesth. 2011.".to_string(),
    ];
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        assert_eq!(" iii ".parse::<AsaClass>().unwrap(), AsaClass::III);
        assert_eq!("vi".parse::<AsaClass>().unwrap(), AsaClass::VI);
    }

    #[test]
    fn test_invalid_class_fails() {
        assert!(classify_asa("VII", false).is_err());
        assert!(classify_asa("", false).is_err());
        assert!(classify_asa("2", false).is_err());
    }

    #[test]
    fn test_elective() {
        let result = classify_asa("II", false).unwrap();
        assert_eq!(result.score, 2.0);
        assert_eq!(result.category, RiskCategory::Low);
        assert_eq!(result.class_label.as_deref(), Some("II"));
        assert!(result.annotation.is_none());
    }

    #[test]
    fn test_emergency_modifier() {
        let result = classify_asa("iii", true).unwrap();
        assert_eq!(result.class_label.as_deref(), Some("III-E"));
        assert_eq!(result.category, RiskCategory::Intermediate);
        assert_eq!(result.annotation.as_deref(), Some("increased by emergency"));
    }

    #[test]
    fn test_emergency_not_annotated_for_class_vi() {
        let result = classify_asa("VI", true).unwrap();
        assert_eq!(result.class_label.as_deref(), Some("VI-E"));
        assert_eq!(result.category, RiskCategory::NotApplicable);
        assert!(result.annotation.is_none());
    }

    #[test]
    fn test_tiers_monotonic_through_v() {
        let classes = [AsaClass::I, AsaClass::II, AsaClass::III, AsaClass::IV, AsaClass::V];
        for pair in classes.windows(2) {
            assert!(pair[0].base_risk() < pair[1].base_risk());
        }
    }
}
