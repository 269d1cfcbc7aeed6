//! The AI analysis pipeline.
//!
//! ```text
//! payload ──▶ cache lookup ──hit──▶ Arc<CacheEntry>
//!                 │ miss
//!                 ▼
//!          build prompt ──▶ invoke (retries) ──▶ normalize ──▶ cache store
//!                                 │ no text
//!                                 ▼
//!                          default structure
//! ```
//!
//! Every call returns a fully populated entry. A degraded model is reported
//! through the entry contents (empty raw text, "AI unavailable" summary),
//! never as an error.

use std::sync::Arc;

use periop_risk_core::AnalysisPayload;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{payload_hash, AnalysisCache, CacheEntry};
use crate::client::TextGenerator;
use crate::config::GenerationConfig;
use crate::invoker::ModelInvoker;
use crate::normalizer::{default_result, normalize, CanonicalResult};
use crate::prompts::build_prompt;
use crate::schema::AnalysisKind;

/// Summary text of the general analysis when the model is unavailable.
pub const AI_UNAVAILABLE: &str = "AI unavailable";

/// Rough characters-per-token ratio used to warn about oversized prompts.
const CHARS_PER_TOKEN: usize = 4;

pub struct Analyzer<G> {
    invoker: ModelInvoker<G>,
    cache: Arc<AnalysisCache>,
}

impl<G: TextGenerator> Analyzer<G> {
    pub fn new(generator: G, config: GenerationConfig, cache: Arc<AnalysisCache>) -> Self {
        Self {
            invoker: ModelInvoker::new(generator, config),
            cache,
        }
    }

    pub fn from_invoker(invoker: ModelInvoker<G>, cache: Arc<AnalysisCache>) -> Self {
        Self { invoker, cache }
    }

    pub fn invoker(&self) -> &ModelInvoker<G> {
        &self.invoker
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    pub fn analyze_general(&self, payload: &AnalysisPayload) -> Arc<CacheEntry> {
        self.analyze(AnalysisKind::General, payload)
    }

    pub fn analyze_medications(&self, payload: &AnalysisPayload) -> Arc<CacheEntry> {
        self.analyze(AnalysisKind::Medications, payload)
    }

    pub fn analyze_scores_interpretation(&self, payload: &AnalysisPayload) -> Arc<CacheEntry> {
        self.analyze(AnalysisKind::ScoresInterpretation, payload)
    }

    /// Run all three analyses.
    pub fn analyze_all(&self, payload: &AnalysisPayload) -> AnalysisReport {
        AnalysisReport {
            general: self.analyze_general(payload),
            medications: self.analyze_medications(payload),
            scores_interpretation: self.analyze_scores_interpretation(payload),
        }
    }

    /// Cached result for `payload`, computing it on a miss.
    ///
    /// Concurrent misses for the same key may each invoke the model; the last
    /// store wins.
    pub fn analyze(&self, kind: AnalysisKind, payload: &AnalysisPayload) -> Arc<CacheEntry> {
        let key = match payload_hash(kind.namespace(), payload) {
            Ok(key) => key,
            Err(e) => {
                warn!(kind = %kind, error = %e, "payload not hashable, skipping cache");
                let (result, raw) = self.compute(kind, payload);
                return Arc::new(CacheEntry::new(String::new(), result, raw));
            }
        };

        if let Some(hit) = self.cache.get(&key) {
            debug!(kind = %kind, key = %key, "cache hit");
            return hit;
        }

        let (result, raw) = self.compute(kind, payload);
        self.cache.insert(CacheEntry::new(key, result, raw))
    }

    fn compute(&self, kind: AnalysisKind, payload: &AnalysisPayload) -> (CanonicalResult, String) {
        let prompt = build_prompt(kind, payload);
        let approx_tokens = prompt.len() / CHARS_PER_TOKEN;
        if approx_tokens > self.invoker.config().max_input_tokens as usize {
            warn!(kind = %kind, approx_tokens, "prompt may exceed the input token limit");
        }

        info!(kind = %kind, model = %self.invoker.config().model, "requesting analysis");
        match self.invoker.invoke(&prompt) {
            Some(text) => (normalize(kind, &text), text),
            None => (fallback(kind), String::new()),
        }
    }
}

/// The structure returned when the model produced nothing.
pub fn fallback(kind: AnalysisKind) -> CanonicalResult {
    let mut result = default_result(kind);
    if kind == AnalysisKind::General {
        result.set_text("executive_summary", AI_UNAVAILABLE);
    }
    result
}

/// The three analyses for one payload.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub general: Arc<CacheEntry>,
    pub medications: Arc<CacheEntry>,
    pub scores_interpretation: Arc<CacheEntry>,
}
