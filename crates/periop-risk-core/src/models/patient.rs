//! Patient profile models.
//!
//! Every section and field is optional on input so that partially filled
//! forms still deserialize.

use serde::{Deserialize, Serialize};

/// Snapshot of everything known about a patient at analysis time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientProfile {
    pub demographics: Demographics,
    pub comorbidities: Comorbidities,
    pub medications: Medications,
    pub labs: Labs,
    pub surgical: Surgical,
    pub functional: FunctionalStatus,
    pub physical_exam: PhysicalExam,
}

/// Demographic data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Demographics {
    pub name: String,
    pub age: Option<i32>,
    /// Free text ("female", "male", "feminino", ...)
    pub sex: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    /// ASA class as entered (I–VI)
    pub asa: Option<String>,
}

impl Demographics {
    /// Body-mass index from weight and height, if both are known.
    ///
    /// Height is floored at 0.5 m to keep typos from producing absurd values.
    pub fn bmi(&self) -> Option<f64> {
        let weight = self.weight_kg?;
        let height_m = (self.height_cm? / 100.0).max(0.5);
        Some(((weight / (height_m * height_m)) * 100.0).round() / 100.0)
    }
}

/// Comorbidity flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Comorbidities {
    pub hypertension: bool,
    pub diabetes_type_1: bool,
    pub diabetes_type_2: bool,
    pub ischemic_heart_disease: bool,
    pub heart_failure: bool,
    pub arrhythmia: bool,
    pub valvular_disease: bool,
    pub copd: bool,
    pub asthma: bool,
    pub restrictive_lung_disease: bool,
    pub renal_failure: bool,
    pub liver_disease: bool,
    pub prior_stroke: bool,
    pub dementia: bool,
    pub depression: bool,
}

/// Current medications: free-text list plus drug-class flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Medications {
    pub list_text: String,
    pub classes: MedicationClasses,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MedicationClasses {
    pub anticoagulants: bool,
    pub antiplatelets: bool,
    pub beta_blockers: bool,
    pub ace_inhibitors_arbs: bool,
    pub diuretics: bool,
    pub statins: bool,
    pub insulin: bool,
    pub oral_antidiabetics: bool,
}

/// Laboratory values. `None` means not measured.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Labs {
    /// g/dL
    pub hemoglobin: Option<f64>,
    /// %
    pub hematocrit: Option<f64>,
    /// 10³/µL
    pub leukocytes: Option<f64>,
    /// 10³/µL
    pub platelets: Option<f64>,
    /// mg/dL
    pub creatinine: Option<f64>,
    /// mg/dL
    pub urea: Option<f64>,
    /// mL/min/1.73m²
    pub gfr: Option<f64>,
    /// mg/dL
    pub glucose: Option<f64>,
    /// %
    pub hba1c: Option<f64>,
    /// g/dL
    pub albumin: Option<f64>,
    /// g/dL
    pub total_protein: Option<f64>,
}

/// Planned procedure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Surgical {
    pub procedure: String,
    pub specialty: Option<String>,
    pub emergency: bool,
    pub expected_duration_hours: Option<f64>,
    pub anesthesia_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FunctionalStatus {
    /// "independent", "partially dependent", "totally dependent"
    pub status: Option<String>,
    /// Metabolic equivalents
    pub mets: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicalExam {
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub spo2: Option<f64>,
    pub temperature_c: Option<f64>,
    pub airway_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi() {
        let demo = Demographics {
            weight_kg: Some(70.0),
            height_cm: Some(170.0),
            ..Default::default()
        };
        assert_eq!(demo.bmi(), Some(24.22));
    }

    #[test]
    fn test_bmi_missing_height() {
        let demo = Demographics {
            weight_kg: Some(70.0),
            ..Default::default()
        };
        assert_eq!(demo.bmi(), None);
    }

    #[test]
    fn test_partial_profile_deserializes() {
        let json = r#"{"demographics":{"age":72},"labs":{"creatinine":1.4}}"#;
        let profile: PatientProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.demographics.age, Some(72));
        assert_eq!(profile.labs.creatinine, Some(1.4));
        assert!(!profile.comorbidities.hypertension);
        assert!(profile.surgical.procedure.is_empty());
    }
}
