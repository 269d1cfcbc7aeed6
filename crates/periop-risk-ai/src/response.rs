//! Text extraction from generation responses.
//!
//! Responses come in more than one shape: a flat `{"text": ...}` object or
//! the Gemini `candidates[].content.parts[].text` tree. Each shape is handled
//! by its own strategy; a strategy that does not recognise the structure
//! returns `None` and the next one is tried.

use serde_json::Value;

/// One way of pulling text out of a raw response.
pub trait TextStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Text found in `response`, or `None` when the shape does not match or
    /// yields only empty text.
    fn extract(&self, response: &Value) -> Option<String>;
}

/// Top-level `text` field.
pub struct DirectText;

impl TextStrategy for DirectText {
    fn name(&self) -> &'static str {
        "direct_text"
    }

    fn extract(&self, response: &Value) -> Option<String> {
        response
            .get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
    }
}

/// Concatenation of every `candidates[*].content.parts[*].text` fragment.
///
/// Candidates or parts with an unexpected structure are skipped rather than
/// aborting the walk.
pub struct CandidateParts;

impl TextStrategy for CandidateParts {
    fn name(&self) -> &'static str {
        "candidate_parts"
    }

    fn extract(&self, response: &Value) -> Option<String> {
        let candidates = response.get("candidates")?.as_array()?;

        let mut text = String::new();
        for candidate in candidates {
            let Some(parts) = candidate
                .get("content")
                .and_then(|c| c.get("parts"))
                .and_then(Value::as_array)
            else {
                continue;
            };
            for part in parts {
                if let Some(fragment) = part.get("text").and_then(Value::as_str) {
                    text.push_str(fragment);
                }
            }
        }

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// The strategies in the order they are tried.
pub fn default_strategies() -> Vec<Box<dyn TextStrategy>> {
    vec![Box::new(DirectText), Box::new(CandidateParts)]
}

/// Run `strategies` in order and return the first text found with the name of
/// the strategy that produced it.
pub fn extract_text(
    response: &Value,
    strategies: &[Box<dyn TextStrategy>],
) -> Option<(&'static str, String)> {
    strategies
        .iter()
        .find_map(|s| s.extract(response).map(|text| (s.name(), text)))
}
