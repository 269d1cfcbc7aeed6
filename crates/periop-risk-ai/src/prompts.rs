//! Prompt templates for the three analyses.
//!
//! Each builder is a pure function of the payload. The patient sections and
//! score results are embedded as JSON, followed by the exact response layout
//! using canonical key names.

use periop_risk_core::{AnalysisPayload, Instrument, ScoreResult};
use serde::Serialize;

use crate::schema::AnalysisKind;

/// Shown in place of an instrument that was not computed.
pub const NOT_CALCULATED: &str = "not calculated";

/// Opening instructions shared by every prompt.
pub const SYSTEM_PREAMBLE: &str = "You are an anesthesiologist specialised in preoperative assessment. \
Do not write preambles, greetings or confirmations. Reply ONLY with valid JSON in exactly the \
requested layout, starting with { and ending with }.";

const GUIDELINES: &str = "Use technical language suitable for anesthesiologists and cite guidelines \
(ACC/AHA, ESC/ESA, ASA, ERAS, ACS-NSQIP) where relevant.";

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn score_line(label: &str, score: Option<&ScoreResult>) -> String {
    match score {
        Some(result) => format!("{label}: {}", json(result)),
        None => format!("{label}: {NOT_CALCULATED}"),
    }
}

fn score_block(payload: &AnalysisPayload, instruments: &[Instrument]) -> String {
    instruments
        .iter()
        .map(|i| score_line(i.name(), payload.scores.get(*i)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn layout(kind: AnalysisKind) -> String {
    serde_json::to_string_pretty(&kind.example_layout()).unwrap_or_default()
}

const ALL_INSTRUMENTS: &[Instrument] = &[
    Instrument::Asa,
    Instrument::Nsqip,
    Instrument::Rcri,
    Instrument::Ariscat,
    Instrument::Akics,
    Instrument::PreDeliric,
    Instrument::StopBang,
];

/// Integrated perioperative risk narrative.
pub fn build_general_prompt(payload: &AnalysisPayload) -> String {
    format!(
        "{SYSTEM_PREAMBLE}\n\
Analyse this patient based on the validated scores below and give a structured perioperative risk assessment.\n\n\
PATIENT DATA: {patient}\n\n\
CALCULATED SCORES:\n{scores}\n\n\
SURGERY: {surgical}\n\n\
Reply in STRICT JSON with this layout, based EXCLUSIVELY on the validated scores:\n{layout}\n\
{GUIDELINES}\n",
        patient = json(&payload.patient),
        scores = score_block(payload, ALL_INSTRUMENTS),
        surgical = json(&payload.patient.surgical),
        layout = layout(AnalysisKind::General),
    )
}

/// Medication management guidance.
pub fn build_medications_prompt(payload: &AnalysisPayload) -> String {
    format!(
        "{SYSTEM_PREAMBLE}\n\
Based on the calculated risk scores and clinical data, analyse the current medications following evidence-based guidelines.\n\n\
RISK SCORES:\n{scores}\n\n\
CURRENT MEDICATIONS: {medications}\n\
RENAL FUNCTION: {labs}\n\
SURGERY: {surgical}\n\n\
Reply in STRICT JSON with this layout. Each item names the drug, the action and its justification; \
`bridging` describes bridging-therapy scenarios:\n{layout}\n\
{GUIDELINES}\n",
        scores = score_block(
            payload,
            &[Instrument::Rcri, Instrument::Ariscat, Instrument::Akics, Instrument::Asa]
        ),
        medications = json(&payload.patient.medications),
        labs = json(&payload.patient.labs),
        surgical = json(&payload.patient.surgical),
        layout = layout(AnalysisKind::Medications),
    )
}

/// Integrated reading of the score results against each other.
pub fn build_scores_interpretation_prompt(payload: &AnalysisPayload) -> String {
    format!(
        "{SYSTEM_PREAMBLE}\n\
Interpret the score results together in a clinically relevant way: where they agree, where they \
diverge and why, and which one matters most for this case.\n\n\
RESULTS:\n{scores}\n\n\
Reply in STRICT JSON with this layout:\n{layout}\n\
Keep the language technical and appropriate for anesthesiologists.\n",
        scores = score_block(payload, ALL_INSTRUMENTS),
        layout = layout(AnalysisKind::ScoresInterpretation),
    )
}

/// Prompt for `kind`.
pub fn build_prompt(kind: AnalysisKind, payload: &AnalysisPayload) -> String {
    match kind {
        AnalysisKind::General => build_general_prompt(payload),
        AnalysisKind::Medications => build_medications_prompt(payload),
        AnalysisKind::ScoresInterpretation => build_scores_interpretation_prompt(payload),
    }
}
