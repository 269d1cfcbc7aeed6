//! Decoding untrusted model text into a fully populated result.
//!
//! Decoding never fails. Stages are tried in order and the first one that
//! yields a JSON object wins:
//!
//! 1. strip the code fence, if the whole text is wrapped in one
//! 2. strict JSON parse of the (unfenced) text
//! 3. strict parse of the first `{` .. last `}` substring
//! 4. permissive literal parse ([`crate::literal`])
//! 5. the kind's default structure
//!
//! When the fenced body fails stages 2-4, they are run again on the whole
//! text before giving up.
//! The decoded object then has its keys mapped through the alias table, each
//! expected key coerced to its type, and missing keys backfilled. The raw text
//! is always kept under [`RAW_TEXT_KEY`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::literal::parse_literal;
use crate::schema::{canonical_key, AnalysisKind, FieldKind};

/// Reserved key holding the unmodified model output.
pub const RAW_TEXT_KEY: &str = "_raw_text";

/// Which stage produced the decoded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStage {
    Strict,
    BraceExtraction,
    Literal,
    Default,
}

/// A normalized analysis result: every expected key present with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalResult(Map<String, Value>);

impl CanonicalResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Narrative field; `""` if absent or not text.
    pub fn text(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// List field as string slices; empty if absent.
    pub fn list(&self, key: &str) -> Vec<&str> {
        strings(self.0.get(key))
    }

    /// One bucket of a bucketed field, e.g. `bucket("medications", "suspend")`.
    pub fn bucket(&self, key: &str, sub: &str) -> Vec<&str> {
        strings(self.0.get(key).and_then(|v| v.get(sub)))
    }

    pub fn raw_text(&self) -> &str {
        self.text(RAW_TEXT_KEY)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Replace a narrative field's value.
    pub(crate) fn set_text(&mut self, key: &str, text: &str) {
        self.0.insert(key.to_string(), Value::String(text.to_string()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn strings(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Decode and normalize `raw` against the schema of `kind`.
pub fn normalize(kind: AnalysisKind, raw: &str) -> CanonicalResult {
    let (decoded, stage) = decode(raw);
    match stage {
        DecodeStage::Default if !raw.trim().is_empty() => {
            warn!(kind = %kind, chars = raw.len(), "model output not decodable, using defaults")
        }
        _ => debug!(kind = %kind, ?stage, "decoded model output"),
    }

    let mut result = conform(kind, decoded);
    result.insert(RAW_TEXT_KEY.to_string(), Value::String(raw.to_string()));
    CanonicalResult(result)
}

/// The default structure of `kind` with an empty raw text.
pub fn default_result(kind: AnalysisKind) -> CanonicalResult {
    let mut map = kind.defaults();
    map.insert(RAW_TEXT_KEY.to_string(), Value::String(String::new()));
    CanonicalResult(map)
}

/// Run the decode stages in order. Always returns an object.
pub fn decode(raw: &str) -> (Map<String, Value>, DecodeStage) {
    strip_fence(raw)
        .into_iter()
        .chain(std::iter::once(raw))
        .find_map(|text| decode_text(text.trim()))
        .unwrap_or_else(|| (Map::new(), DecodeStage::Default))
}

fn decode_text(text: &str) -> Option<(Map<String, Value>, DecodeStage)> {
    if let Some(map) = parse_strict(text) {
        return Some((map, DecodeStage::Strict));
    }

    let braces = brace_span(text);
    if let Some(map) = braces.and_then(parse_strict) {
        return Some((map, DecodeStage::BraceExtraction));
    }

    match parse_literal(braces.unwrap_or(text)) {
        Ok(Value::Object(map)) => Some((map, DecodeStage::Literal)),
        _ => None,
    }
}

/// Body of the fence (```` ```json ... ``` ````) when `text` opens with one.
/// Fences further into the text are left alone.
pub fn strip_fence(text: &str) -> Option<&str> {
    let after = text.trim_start().strip_prefix("```")?;
    // Language tag runs to the end of the opening line
    let body_start = match after.find('\n') {
        Some(nl) if after[..nl].chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') => nl + 1,
        _ => after
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(after.len()),
    };
    let body = &after[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(&body[..end])
}

fn parse_strict(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Alias normalization, coercion and backfill.
fn conform(kind: AnalysisKind, decoded: Map<String, Value>) -> Map<String, Value> {
    let mut out = alias_keys(decoded);

    for field in kind.fields() {
        let value = out.remove(field.name).unwrap_or(Value::Null);
        out.insert(field.name.to_string(), coerce(field.kind, value));
    }
    out
}

/// Rename keys to canonical names. A key that is already canonical wins over
/// an alias of it.
fn alias_keys(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    let mut aliased = Vec::new();
    for (key, value) in map {
        let canonical = canonical_key(&key);
        if canonical == key {
            out.insert(canonical, value);
        } else {
            aliased.push((canonical, value));
        }
    }
    for (key, value) in aliased {
        out.entry(key).or_insert(value);
    }
    out
}

fn coerce(kind: FieldKind, value: Value) -> Value {
    match kind {
        FieldKind::Text => Value::String(to_text(value)),
        FieldKind::List => Value::Array(to_list(value)),
        FieldKind::Buckets(keys) => {
            let mut source = match value {
                Value::Object(map) => alias_keys(map),
                _ => Map::new(),
            };
            Value::Object(
                keys.iter()
                    .map(|k| {
                        let v = source.remove(*k).unwrap_or(Value::Null);
                        (k.to_string(), Value::Array(to_list(v)))
                    })
                    .collect(),
            )
        }
    }
}

fn to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        obj @ Value::Object(_) => obj.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn to_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| Value::String(to_text(v)))
            .collect(),
        v if is_truthy(&v) => vec![Value::String(to_text(v))],
        _ => Vec::new(),
    }
}
