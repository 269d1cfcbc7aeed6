//! Generation configuration.
//!
//! Supplied by the caller's configuration provider; this crate never reads
//! the environment or credential stores itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const MAX_INPUT_TOKENS: u32 = 32_768;
pub const MAX_OUTPUT_TOKENS: u32 = 2_048;
pub const TEMPERATURE: f32 = 0.3;
pub const TOP_P: f32 = 0.95;
pub const TOP_K: u32 = 40;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const RETRY_MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BACKOFF_INITIAL_SECS: f64 = 1.0;
pub const RETRY_BACKOFF_MAX_SECS: f64 = 8.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Model parameters, timeout and retry policy for one analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub endpoint: String,
    /// Never serialized back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_input_tokens: u32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub retry_max_attempts: u32,
    /// Connectivity check only; the analysis path never sleeps
    pub retry_backoff_initial_secs: f64,
    pub retry_backoff_max_secs: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_input_tokens: MAX_INPUT_TOKENS,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_max_attempts: RETRY_MAX_ATTEMPTS,
            retry_backoff_initial_secs: RETRY_BACKOFF_INITIAL_SECS,
            retry_backoff_max_secs: RETRY_BACKOFF_MAX_SECS,
        }
    }
}

impl GenerationConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Attempts per call; a configured zero still makes one attempt.
    pub fn attempts(&self) -> u32 {
        self.retry_max_attempts.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based) of the connectivity check:
    /// `min(initial · 2^(attempt-1), max)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(30) as i32;
        let secs = (self.retry_backoff_initial_secs * 2f64.powi(exp)).min(self.retry_backoff_max_secs);
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// The `generationConfig` object of a Gemini request.
    pub fn generation_params(&self) -> serde_json::Value {
        serde_json::json!({
            "temperature": self.temperature,
            "topP": self.top_p,
            "topK": self.top_k,
            "maxOutputTokens": self.max_output_tokens,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigError::Invalid(format!("top_p {} outside [0, 1]", self.top_p)));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Invalid("max_output_tokens must be positive".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.retry_backoff_initial_secs < 0.0 || self.retry_backoff_max_secs < 0.0 {
            return Err(ConfigError::Invalid("backoff must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = GenerationConfig::default();
        assert_eq!(cfg.model, "gemini-2.5-pro");
        assert_eq!(cfg.attempts(), 3);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let cfg = GenerationConfig {
            retry_max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(cfg.attempts(), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let cfg = GenerationConfig::default();
        assert_eq!(cfg.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(cfg.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(cfg.backoff_delay(3), Duration::from_secs(4));
        assert_eq!(cfg.backoff_delay(5), Duration::from_secs(8));
        assert_eq!(cfg.backoff_delay(40), Duration::from_secs(8));
    }

    #[test]
    fn test_partial_config_deserializes() {
        let cfg: GenerationConfig =
            serde_json::from_str(r#"{"model":"gemini-2.5-flash","api_key":"k","timeout_secs":10}"#)
                .unwrap();
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.top_k, 40);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let cfg = GenerationConfig::default().with_api_key("secret");
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = GenerationConfig {
            temperature: 3.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = GenerationConfig {
            model: " ".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
