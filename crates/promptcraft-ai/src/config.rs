//! Controller configuration.

use std::path::PathBuf;
use std::time::Duration;

use promptcraft_ollama::{
    GenerateOptions, Timeouts, DEFAULT_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_PROCESS_NAME,
};

/// Configuration for the readiness controller.
#[derive(Debug, Clone)]
pub struct PromptCraftConfig {
    /// Base URL of the Ollama HTTP API
    pub base_url: String,
    /// Model that must be present before generating (default: tinyllama)
    pub model: String,
    /// Explicit path to the ollama executable; searched for when unset
    pub ollama_bin: Option<PathBuf>,
    /// Name fragment used to detect a running service process
    pub process_name: String,
    /// Readiness checks before giving up on startup
    pub readiness_attempts: u32,
    /// Fixed sleep between readiness checks
    pub readiness_interval: Duration,
    /// Per-request time bounds
    pub timeouts: Timeouts,
    /// Sampling options for generation
    pub sampling: GenerateOptions,
}

impl Default for PromptCraftConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            ollama_bin: None,
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            readiness_attempts: 20,
            readiness_interval: Duration::from_secs(1),
            timeouts: Timeouts::default(),
            sampling: GenerateOptions::default(),
        }
    }
}

impl PromptCraftConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup("PROMPTCRAFT_OLLAMA_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let model = lookup("PROMPTCRAFT_MODEL")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.model);

        let ollama_bin = lookup("PROMPTCRAFT_OLLAMA_BIN")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let readiness_attempts = lookup("PROMPTCRAFT_READY_ATTEMPTS")
            .and_then(|v| v.parse().ok())
            .filter(|&n: &u32| n > 0)
            .unwrap_or(defaults.readiness_attempts);

        Self {
            base_url,
            model,
            ollama_bin,
            readiness_attempts,
            ..defaults
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> PromptCraftConfigBuilder {
        PromptCraftConfigBuilder::default()
    }
}

/// Builder for controller configuration.
#[derive(Debug, Default)]
pub struct PromptCraftConfigBuilder {
    config: PromptCraftConfig,
}

impl PromptCraftConfigBuilder {
    /// Set the Ollama API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the model to ensure and generate with.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Use this executable instead of searching PATH and install locations.
    pub fn ollama_bin(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ollama_bin = Some(path.into());
        self
    }

    /// Set the process name fragment used to detect a running service.
    pub fn process_name(mut self, name: impl Into<String>) -> Self {
        self.config.process_name = name.into();
        self
    }

    /// Set the readiness check budget. At least one check is always made.
    pub fn readiness_attempts(mut self, attempts: u32) -> Self {
        self.config.readiness_attempts = attempts.max(1);
        self
    }

    /// Set the sleep between readiness checks.
    pub fn readiness_interval(mut self, interval: Duration) -> Self {
        self.config.readiness_interval = interval;
        self
    }

    /// Set per-request time bounds.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Set generation sampling options.
    pub fn sampling(mut self, sampling: GenerateOptions) -> Self {
        self.config.sampling = sampling;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PromptCraftConfig {
        self.config
    }
}
