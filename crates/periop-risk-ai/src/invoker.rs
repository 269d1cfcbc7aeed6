//! Bounded-retry model invocation.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::client::TextGenerator;
use crate::config::GenerationConfig;
use crate::response::{default_strategies, extract_text, TextStrategy};

/// Runs one prompt through a [`TextGenerator`] with sequential retries.
///
/// Failures are absorbed: [`ModelInvoker::invoke`] yields `None` when every
/// attempt errored or produced no text.
pub struct ModelInvoker<G> {
    generator: G,
    config: GenerationConfig,
    strategies: Vec<Box<dyn TextStrategy>>,
}

impl<G: TextGenerator> ModelInvoker<G> {
    pub fn new(generator: G, config: GenerationConfig) -> Self {
        Self {
            generator,
            config,
            strategies: default_strategies(),
        }
    }

    /// Replace the text extraction strategies.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn TextStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Model text for `prompt`, or `None` once all attempts are exhausted.
    ///
    /// Retries are immediate; each attempt is bounded by the generator's timeout.
    pub fn invoke(&self, prompt: &str) -> Option<String> {
        let attempts = self.config.attempts();
        for attempt in 1..=attempts {
            match self.generator.generate(prompt, &self.config) {
                Ok(response) => match extract_text(&response, &self.strategies) {
                    Some((strategy, text)) => {
                        debug!(attempt, strategy, chars = text.len(), "model text extracted");
                        return Some(text);
                    }
                    None => warn!(attempt, attempts, "model response had no text"),
                },
                Err(e) => warn!(attempt, attempts, error = %e, "model call failed"),
            }
        }
        error!(attempts, model = %self.config.model, "model unavailable after retries");
        None
    }

    /// Send `"ping"` and report whether the service answered, sleeping with
    /// exponential backoff between failed attempts.
    pub fn check_connection(&self) -> bool {
        self.check_connection_with(std::thread::sleep)
    }

    /// [`Self::check_connection`] with an injectable sleep.
    pub fn check_connection_with(&self, mut sleep: impl FnMut(Duration)) -> bool {
        let attempts = self.config.attempts();
        for attempt in 1..=attempts {
            info!(attempt, model = %self.config.model, "checking model connection");
            match self.generator.generate("ping", &self.config) {
                Ok(response) if answered(&response, &self.strategies) => {
                    info!("model connection ok");
                    return true;
                }
                Ok(_) => warn!(attempt, "empty response to ping"),
                Err(e) => warn!(attempt, error = %e, "model connection failed"),
            }
            if attempt < attempts {
                let delay = self.config.backoff_delay(attempt);
                info!(delay_secs = delay.as_secs_f64(), "waiting before retry");
                sleep(delay);
            }
        }
        error!(attempts, "model connection failed after retries");
        false
    }
}

fn answered(response: &Value, strategies: &[Box<dyn TextStrategy>]) -> bool {
    extract_text(response, strategies).is_some()
        || response
            .get("candidates")
            .and_then(Value::as_array)
            .is_some_and(|c| !c.is_empty())
}
