//! Golden tests for the scoring instruments.
//!
//! These tests pin known patients to their expected totals and categories.

use periop_risk_core::models::RiskCategory;
use periop_risk_core::scores::{
    akics_score, ariscat_score, classify_asa, pre_deliric_score, rcri_score, AdmissionGroup,
    AkicsInputs, AriscatFactors, CardiacSurgeryType, PreDeliricInputs, RcriFactors,
};

/// RCRI golden case.
struct RcriCase {
    id: &'static str,
    factors: RcriFactors,
    expected_score: f64,
    expected_class: &'static str,
    expected_category: RiskCategory,
}

fn rcri_cases() -> Vec<RcriCase> {
    vec![
        RcriCase {
            id: "healthy-elective",
            factors: RcriFactors::default(),
            expected_score: 0.0,
            expected_class: "Class I",
            expected_category: RiskCategory::Low,
        },
        RcriCase {
            id: "diabetic-on-insulin",
            factors: RcriFactors {
                insulin_treated_diabetes: true,
                ..Default::default()
            },
            expected_score: 1.0,
            expected_class: "Class II",
            expected_category: RiskCategory::Intermediate,
        },
        RcriCase {
            id: "vascular-with-ihd",
            factors: RcriFactors {
                high_risk_surgery: true,
                ischemic_heart_disease: true,
                ..Default::default()
            },
            expected_score: 2.0,
            expected_class: "Class III",
            expected_category: RiskCategory::Intermediate,
        },
        RcriCase {
            id: "heart-failure-ckd-stroke",
            factors: RcriFactors {
                congestive_heart_failure: true,
                cerebrovascular_disease: true,
                creatinine_gt_2mg_dl: true,
                ..Default::default()
            },
            expected_score: 3.0,
            expected_class: "Class IV",
            expected_category: RiskCategory::High,
        },
    ]
}

#[test]
fn test_rcri_golden() {
    for case in rcri_cases() {
        let result = rcri_score(&case.factors);
        assert_eq!(result.score, case.expected_score, "case {}", case.id);
        assert_eq!(
            result.class_label.as_deref(),
            Some(case.expected_class),
            "case {}",
            case.id
        );
        assert_eq!(result.category, case.expected_category, "case {}", case.id);
    }
}

#[test]
fn test_ariscat_intermediate_patient() {
    // 70-year-old, upper abdominal surgery lasting 2.5h
    let factors = AriscatFactors {
        age_51_80: true,
        incision_upper_abdominal: true,
        duration_2_to_3h: true,
        ..Default::default()
    };
    let result = ariscat_score(&factors);
    assert_eq!(result.score, 34.0);
    assert_eq!(result.category, RiskCategory::Intermediate);
    assert_eq!(result.risk_percent, Some(13.3));
}

#[test]
fn test_asa_rejects_unknown_class() {
    let err = classify_asa("IIV", false).unwrap_err();
    assert!(err.to_string().contains("ASA class"));
}

#[test]
fn test_akics_boundary_ages() {
    let make = |age| AkicsInputs {
        age,
        female: false,
        heart_failure: false,
        hypertension: false,
        emergency: false,
        surgery_type: CardiacSurgeryType::Valve,
        creatinine_mg_dl: 1.0,
        noncardiac_complexity: None,
    };
    assert!(akics_score(&make(-1)).is_err());
    assert!(akics_score(&make(150)).is_err());
    assert!(akics_score(&make(0)).is_ok());
    assert!(akics_score(&make(120)).is_ok());
}

#[test]
fn test_pre_deliric_from_json() {
    let json = r#"{
        "age": 68,
        "apache_ii": 16,
        "admission_group": "surgical",
        "coma": false,
        "infection": true,
        "ph": 7.30,
        "sedatives": true,
        "opioids": true,
        "urea_mg_dl": 60,
        "creatinine_mg_dl": 1.2
    }"#;
    let inputs: PreDeliricInputs = serde_json::from_str(json).unwrap();
    assert_eq!(inputs.admission_group, AdmissionGroup::Surgical);

    // age 2 + apache 3 + surgical 1 + infection 1 + acidosis 2 + sedatives 1 + opioids 2 + ratio 50 → 2
    let result = pre_deliric_score(&inputs).unwrap();
    assert_eq!(result.score, 14.0);
    assert_eq!(result.category, RiskCategory::Moderate);
}

#[test]
fn test_pre_deliric_ph_edges() {
    let make = |ph| PreDeliricInputs {
        age: 60,
        apache_ii: 10.0,
        admission_group: AdmissionGroup::Medical,
        coma: false,
        infection: false,
        ph,
        hco3: Some(22.0),
        sedatives: false,
        opioids: false,
        urea_mg_dl: 40.0,
        creatinine_mg_dl: 1.0,
    };
    assert!(pre_deliric_score(&make(6.7)).is_err());
    assert!(pre_deliric_score(&make(7.9)).is_err());
    assert!(pre_deliric_score(&make(6.8)).is_ok());
    assert!(pre_deliric_score(&make(7.8)).is_ok());
}
