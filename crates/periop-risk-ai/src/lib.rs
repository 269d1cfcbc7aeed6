//! AI interpretation of perioperative risk scores.
//!
//! Builds prompts from an [`AnalysisPayload`](periop_risk_core::AnalysisPayload),
//! calls a generative model through a [`TextGenerator`], and decodes whatever
//! comes back into a fixed, fully populated [`CanonicalResult`]. Results are
//! cached by payload hash so each distinct input reaches the model at most once.
//!
//! The Gemini HTTP client sits behind the `http` feature.

pub mod analysis;
pub mod cache;
pub mod client;
pub mod config;
pub mod invoker;
pub mod literal;
pub mod normalizer;
pub mod prompts;
pub mod response;
pub mod schema;

pub use analysis::{fallback, AnalysisReport, Analyzer, AI_UNAVAILABLE};
pub use cache::{payload_hash, AnalysisCache, CacheEntry};
pub use client::{GenerateError, GenerateResult, TextGenerator};
#[cfg(feature = "http")]
pub use client::GeminiClient;
pub use config::{ConfigError, GenerationConfig};
pub use invoker::ModelInvoker;
pub use normalizer::{normalize, CanonicalResult, DecodeStage, RAW_TEXT_KEY};
pub use prompts::*;
pub use schema::{AnalysisKind, FieldKind};
