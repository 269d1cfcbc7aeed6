//! Transport to the remote text-generation service.

use serde_json::Value;
use thiserror::Error;

use crate::config::GenerationConfig;

/// Transport errors. Retried by the invoker, never surfaced past it.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

/// One blocking generation call returning the raw response body as JSON.
///
/// Implementations must enforce `config.timeout()` per call.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerateResult<Value>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerateResult<Value> {
        (**self).generate(prompt, config)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerateResult<Value> {
        (**self).generate(prompt, config)
    }
}

/// Request body for the Gemini `generateContent` endpoint.
pub fn gemini_request_body(prompt: &str, config: &GenerationConfig) -> Value {
    serde_json::json!({
        "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        "generationConfig": config.generation_params(),
    })
}

#[cfg(feature = "http")]
pub use http::GeminiClient;

#[cfg(feature = "http")]
mod http {
    use super::*;

    /// Blocking client for the Gemini REST API.
    pub struct GeminiClient {
        agent: ureq::Agent,
    }

    impl GeminiClient {
        /// Build a client whose every request is bounded by `config.timeout()`.
        pub fn new(config: &GenerationConfig) -> Self {
            let agent_config = ureq::Agent::config_builder()
                .timeout_global(Some(config.timeout()))
                .build();
            Self {
                agent: agent_config.into(),
            }
        }

        fn url(config: &GenerationConfig) -> String {
            format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            )
        }
    }

    impl TextGenerator for GeminiClient {
        fn generate(&self, prompt: &str, config: &GenerationConfig) -> GenerateResult<Value> {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| GenerateError::NotConfigured("missing API key".into()))?;

            let body = gemini_request_body(prompt, config);
            let mut response = self
                .agent
                .post(&Self::url(config))
                .header("x-goog-api-key", api_key)
                .send_json(&body)
                .map_err(|e| match e {
                    ureq::Error::Timeout(_) => GenerateError::Timeout(config.timeout_secs),
                    other => GenerateError::Http(other.to_string()),
                })?;

            let text = response
                .body_mut()
                .read_to_string()
                .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;
            Ok(serde_json::from_str(&text)?)
        }
    }

}
