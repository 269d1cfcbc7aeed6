//! Analysis payload: the patient plus every computed score.

use serde::{Deserialize, Serialize};

use super::{Instrument, PatientProfile, ScoreResult};

/// Results of each instrument for one patient. Absent means not calculated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreSet {
    pub asa: Option<ScoreResult>,
    pub nsqip: Option<ScoreResult>,
    pub rcri: Option<ScoreResult>,
    pub ariscat: Option<ScoreResult>,
    pub akics: Option<ScoreResult>,
    pub pre_deliric: Option<ScoreResult>,
    pub stop_bang: Option<ScoreResult>,
}

impl ScoreSet {
    /// Store a result in the slot for its instrument, replacing any previous one.
    pub fn insert(&mut self, result: ScoreResult) {
        let slot = match result.instrument {
            Instrument::Asa => &mut self.asa,
            Instrument::Nsqip => &mut self.nsqip,
            Instrument::Rcri => &mut self.rcri,
            Instrument::Ariscat => &mut self.ariscat,
            Instrument::Akics => &mut self.akics,
            Instrument::PreDeliric => &mut self.pre_deliric,
            Instrument::StopBang => &mut self.stop_bang,
        };
        *slot = Some(result);
    }

    pub fn get(&self, instrument: Instrument) -> Option<&ScoreResult> {
        match instrument {
            Instrument::Asa => self.asa.as_ref(),
            Instrument::Nsqip => self.nsqip.as_ref(),
            Instrument::Rcri => self.rcri.as_ref(),
            Instrument::Ariscat => self.ariscat.as_ref(),
            Instrument::Akics => self.akics.as_ref(),
            Instrument::PreDeliric => self.pre_deliric.as_ref(),
            Instrument::StopBang => self.stop_bang.as_ref(),
        }
    }

    /// Number of instruments with a result.
    pub fn len(&self) -> usize {
        [
            &self.asa,
            &self.nsqip,
            &self.rcri,
            &self.ariscat,
            &self.akics,
            &self.pre_deliric,
            &self.stop_bang,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Input to every AI analysis, and the identity basis for caching.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisPayload {
    pub patient: PatientProfile,
    pub scores: ScoreSet,
}

impl AnalysisPayload {
    pub fn new(patient: PatientProfile, scores: ScoreSet) -> Self {
        Self { patient, scores }
    }

    /// Serialize with object keys in sorted order.
    ///
    /// Going through `serde_json::Value` sorts keys (its map is a `BTreeMap`),
    /// so the output is stable for equal payloads regardless of field order.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskCategory;

    #[test]
    fn test_insert_and_get() {
        let mut set = ScoreSet::default();
        assert!(set.is_empty());

        set.insert(ScoreResult::new(Instrument::Rcri, 1.0, RiskCategory::Intermediate));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Instrument::Rcri).unwrap().score, 1.0);
        assert!(set.get(Instrument::Asa).is_none());
    }

    #[test]
    fn test_canonical_json_is_deterministic() {
        let mut payload = AnalysisPayload::default();
        payload.patient.demographics.age = Some(64);
        payload
            .scores
            .insert(ScoreResult::new(Instrument::Rcri, 2.0, RiskCategory::Intermediate));

        let json1 = payload.to_canonical_json().unwrap();
        let json2 = payload.clone().to_canonical_json().unwrap();
        assert_eq!(json1, json2);
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let json = AnalysisPayload::default().to_canonical_json().unwrap();
        let patient_pos = json.find("\"patient\"").unwrap();
        let scores_pos = json.find("\"scores\"").unwrap();
        assert!(patient_pos < scores_pos);

        let comorb = json.find("\"comorbidities\"").unwrap();
        let demo = json.find("\"demographics\"").unwrap();
        assert!(comorb < demo);
    }
}
