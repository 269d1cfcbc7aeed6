//! Expected response shapes for each analysis kind.
//!
//! Every kind has a fixed list of top-level fields with a typed default. Keys
//! coming back from the model are mapped onto canonical names through a single
//! alias table shared by all kinds and by bucket sub-keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sub-keys of the medication buckets, in every schema that has them.
pub const MEDICATION_BUCKETS: &[&str] = &["suspend", "maintain", "adjust"];

/// Sub-keys of the general analysis per-system breakdown.
pub const SYSTEM_BUCKETS: &[&str] = &["cardiovascular", "pulmonary", "renal", "delirium"];

/// Value type of an expected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Narrative string, default `""`.
    Text,
    /// List of strings, default `[]`.
    List,
    /// Object with exactly these sub-keys, each a list of strings.
    Buckets(&'static [&'static str]),
}

impl FieldKind {
    pub fn default_value(self) -> Value {
        match self {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::List => Value::Array(Vec::new()),
            FieldKind::Buckets(keys) => Value::Object(
                keys.iter()
                    .map(|k| (k.to_string(), Value::Array(Vec::new())))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind }
}

const GENERAL_FIELDS: &[Field] = &[
    field("executive_summary", FieldKind::Text),
    field("by_system", FieldKind::Buckets(SYSTEM_BUCKETS)),
    field("overall_stratification", FieldKind::Text),
    field("recommendations", FieldKind::List),
    field("medications", FieldKind::Buckets(MEDICATION_BUCKETS)),
    field("monitoring", FieldKind::List),
];

const MEDICATION_FIELDS: &[Field] = &[
    field("suspend", FieldKind::List),
    field("maintain", FieldKind::List),
    field("adjust", FieldKind::List),
    field("prophylaxis", FieldKind::List),
    field("bridging", FieldKind::List),
];

const INTERPRETATION_FIELDS: &[Field] = &[
    field("agreement", FieldKind::List),
    field("divergence", FieldKind::List),
    field("relevance", FieldKind::Text),
    field("limitations", FieldKind::List),
    field("global_risk", FieldKind::Text),
    field("attention_points", FieldKind::List),
    field("preop_optimization", FieldKind::List),
];

/// The three AI analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    General,
    Medications,
    ScoresInterpretation,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::General,
        AnalysisKind::Medications,
        AnalysisKind::ScoresInterpretation,
    ];

    /// Cache namespace; distinct per kind so equal payloads never collide.
    pub fn namespace(self) -> &'static str {
        match self {
            AnalysisKind::General => "general",
            AnalysisKind::Medications => "medications",
            AnalysisKind::ScoresInterpretation => "scores_interpretation",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            AnalysisKind::General => GENERAL_FIELDS,
            AnalysisKind::Medications => MEDICATION_FIELDS,
            AnalysisKind::ScoresInterpretation => INTERPRETATION_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<Field> {
        self.fields().iter().copied().find(|f| f.name == name)
    }

    /// Every expected key with its default.
    pub fn defaults(self) -> Map<String, Value> {
        self.fields()
            .iter()
            .map(|f| (f.name.to_string(), f.kind.default_value()))
            .collect()
    }

    /// The response layout shown to the model, with placeholder values.
    pub fn example_layout(self) -> Value {
        let placeholder = Value::String("...".into());
        let list = Value::Array(vec![placeholder.clone()]);
        Value::Object(
            self.fields()
                .iter()
                .map(|f| {
                    let v = match f.kind {
                        FieldKind::Text => placeholder.clone(),
                        FieldKind::List => list.clone(),
                        FieldKind::Buckets(keys) => Value::Object(
                            keys.iter().map(|k| (k.to_string(), list.clone())).collect(),
                        ),
                    };
                    (f.name.to_string(), v)
                })
                .collect(),
        )
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Synonyms and Portuguese variants, keyed by folded form.
static ALIASES: &[(&str, &str)] = &[
    // general
    ("resumo_executivo", "executive_summary"),
    ("resumo", "executive_summary"),
    ("summary", "executive_summary"),
    ("por_sistemas", "by_system"),
    ("por_sistema", "by_system"),
    ("systems", "by_system"),
    ("by_systems", "by_system"),
    ("estratificacao_geral", "overall_stratification"),
    ("estratificacao", "overall_stratification"),
    ("stratification", "overall_stratification"),
    ("recomendacoes", "recommendations"),
    ("recomendacao", "recommendations"),
    ("recommendation", "recommendations"),
    ("medicacoes", "medications"),
    ("medicamentos", "medications"),
    ("medication", "medications"),
    ("monitorizacao", "monitoring"),
    ("monitoramento", "monitoring"),
    ("monitorization", "monitoring"),
    // per-system buckets
    ("cardio", "cardiovascular"),
    ("cardiovascular_system", "cardiovascular"),
    ("pulmonar", "pulmonary"),
    ("respiratorio", "pulmonary"),
    ("respiratory", "pulmonary"),
    ("rim", "renal"),
    ("kidney", "renal"),
    ("delirio", "delirium"),
    // medication buckets
    ("suspender", "suspend"),
    ("suspensao", "suspend"),
    ("stop", "suspend"),
    ("hold", "suspend"),
    ("manter", "maintain"),
    ("continue", "maintain"),
    ("keep", "maintain"),
    ("ajustar", "adjust"),
    ("ajuste", "adjust"),
    ("modify", "adjust"),
    ("profilaxias", "prophylaxis"),
    ("profilaxia", "prophylaxis"),
    ("prophylaxes", "prophylaxis"),
    ("bridge", "bridging"),
    ("ponte", "bridging"),
    ("terapia_ponte", "bridging"),
    ("bridge_therapy", "bridging"),
    // score interpretation
    ("concordancia", "agreement"),
    ("agreements", "agreement"),
    ("divergencia", "divergence"),
    ("divergences", "divergence"),
    ("relevancia", "relevance"),
    ("most_relevant", "relevance"),
    ("limitacoes", "limitations"),
    ("limitacao", "limitations"),
    ("limitation", "limitations"),
    ("risco_global", "global_risk"),
    ("overall_risk", "global_risk"),
    ("pontos_atencao", "attention_points"),
    ("pontos_de_atencao", "attention_points"),
    ("attention", "attention_points"),
    ("otimizacao_preop", "preop_optimization"),
    ("otimizacao_pre_operatoria", "preop_optimization"),
    ("otimizacao", "preop_optimization"),
    ("optimization", "preop_optimization"),
];

/// Lowercase, strip Portuguese diacritics and turn separators into `_`.
pub fn fold_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.trim().chars().flat_map(char::to_lowercase) {
        let c = match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' | '.' => '_',
            other => other,
        };
        out.push(c);
    }
    out
}

/// Canonical name for `key`. Unknown keys come back folded.
pub fn canonical_key(key: &str) -> String {
    let folded = fold_key(key);
    match ALIASES.iter().find(|(alias, _)| *alias == folded) {
        Some((_, canonical)) => canonical.to_string(),
        None => folded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_distinct() {
        let mut names: Vec<_> = AnalysisKind::ALL.iter().map(|k| k.namespace()).collect();
        names.dedup();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_defaults_are_typed() {
        let defaults = AnalysisKind::General.defaults();
        assert_eq!(defaults.len(), 6);
        assert_eq!(defaults["executive_summary"], Value::String(String::new()));
        assert_eq!(defaults["recommendations"], Value::Array(vec![]));
        let meds = defaults["medications"].as_object().unwrap();
        let mut keys: Vec<_> = meds.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["adjust", "maintain", "suspend"]);
    }

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("Monitorização"), "monitorizacao");
        assert_eq!(fold_key(" Pontos de Atenção "), "pontos_de_atencao");
        assert_eq!(fold_key("risco-global"), "risco_global");
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("resumo_executivo"), "executive_summary");
        assert_eq!(canonical_key("Medicações"), "medications");
        assert_eq!(canonical_key("suspender"), "suspend");
        assert_eq!(canonical_key("Concordância"), "agreement");
        assert_eq!(canonical_key("recommendations"), "recommendations");
        assert_eq!(canonical_key("Something Else"), "something_else");
    }

    #[test]
    fn test_every_alias_targets_an_expected_name() {
        let mut known: Vec<&str> = AnalysisKind::ALL
            .iter()
            .flat_map(|k| k.fields().iter().map(|f| f.name))
            .collect();
        known.extend(MEDICATION_BUCKETS);
        known.extend(SYSTEM_BUCKETS);
        for (alias, canonical) in ALIASES {
            assert!(known.contains(canonical), "{alias} -> {canonical}");
            assert_eq!(fold_key(alias), *alias);
        }
    }

    #[test]
    fn test_example_layout_has_every_field() {
        for kind in AnalysisKind::ALL {
            let layout = kind.example_layout();
            for f in kind.fields() {
                assert!(layout.get(f.name).is_some());
            }
        }
    }
}
