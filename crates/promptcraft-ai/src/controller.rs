//! Service readiness controller - bootstraps Ollama and gates generation.

use std::fmt;
use std::sync::Mutex;

use promptcraft_ollama::{
    GenerateRequest, OllamaClient, OllamaError, PullProgress, ServiceChild, ServiceHost,
    SystemHost,
};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::PromptCraftConfig;
use crate::prompt;

/// Text returned when the service answers without a `response` field.
pub const NO_RESPONSE: &str = "No response generated.";

/// Fatal failures of the startup path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("Ollama executable not found. Ensure it's installed and added to PATH.")]
    ExecutableNotFound,
    #[error("failed to start Ollama: {0}")]
    SpawnFailed(String),
    #[error("Ollama did not start in time ({attempts} readiness checks failed)")]
    Timeout { attempts: u32 },
}

/// Outcome of making sure a model is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    /// The service was not reachable; nothing else was attempted.
    NotReady,
    AlreadyPresent,
    FreshlyFetched,
    /// The model was missing and the pull failed.
    FetchFailed(String),
    /// The model listing itself failed.
    QueryFailed(String),
}

impl ModelStatus {
    /// Only a present or freshly pulled model lets generation proceed.
    pub fn permits_generation(&self) -> bool {
        matches!(self, Self::AlreadyPresent | Self::FreshlyFetched)
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "service not ready"),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::FreshlyFetched => write!(f, "freshly fetched"),
            Self::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            Self::QueryFailed(reason) => write!(f, "model query failed: {}", reason),
        }
    }
}

/// Failures of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Please enter a description.")]
    EmptyInput,
    #[error("Please ensure Ollama is running and {model} model is available ({status}).")]
    ModelUnavailable { model: String, status: ModelStatus },
    #[error("Request timed out. The model is taking too long to respond.")]
    Timeout,
    #[error("{0}")]
    Request(String),
}

impl From<OllamaError> for GenerationError {
    fn from(e: OllamaError) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Render a generation result as the text shown to the user.
pub fn display_text(result: &Result<String, GenerationError>) -> String {
    match result {
        Ok(text) => text.clone(),
        Err(e) => format!("Error: {}", e),
    }
}

/// Snapshot of the service as seen from this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub process_active: bool,
    pub reachable: bool,
    /// `None` when the listing could not be queried.
    pub model_present: Option<bool>,
}

/// Ensures the local inference service is up and the model is loaded before
/// any generation request is sent.
pub struct ServiceReadinessController {
    config: PromptCraftConfig,
    client: OllamaClient,
    host: Box<dyn ServiceHost>,
    /// Set only when this controller spawned the service.
    child: Mutex<Option<Box<dyn ServiceChild>>>,
}

impl ServiceReadinessController {
    /// Create a controller using the real process table.
    pub fn new(config: PromptCraftConfig) -> Result<Self, OllamaError> {
        Self::with_host(config, Box::new(SystemHost::new()))
    }

    /// Create a controller with a custom process host.
    pub fn with_host(
        config: PromptCraftConfig,
        host: Box<dyn ServiceHost>,
    ) -> Result<Self, OllamaError> {
        let client = OllamaClient::with_url(config.base_url.clone(), config.timeouts)?;
        Ok(Self {
            config,
            client,
            host,
            child: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PromptCraftConfig {
        &self.config
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Whether this controller started the service process.
    pub fn owns_service(&self) -> bool {
        self.child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Run the full bootstrap sequence: start, wait for readiness, ensure the
    /// configured model.
    pub async fn bootstrap(&self) -> Result<ModelStatus, StartupError> {
        self.ensure_service_running().await?;
        let status = self.ensure_model_loaded(&self.config.model).await;
        if !status.permits_generation() {
            warn!("Model '{}' unavailable: {}", self.config.model, status);
        }
        Ok(status)
    }

    /// Start the service if no matching process is running, then poll until
    /// it answers or the attempt budget runs out.
    pub async fn ensure_service_running(&self) -> Result<(), StartupError> {
        if self.host.is_process_active(&self.config.process_name) {
            debug!("Ollama process already running");
        } else {
            self.start_service()?;
        }
        self.wait_ready().await
    }

    fn start_service(&self) -> Result<(), StartupError> {
        let mut child = self
            .child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = child.as_mut() {
            if existing.is_alive() {
                debug!("Ollama server already started by this controller");
                return Ok(());
            }
            warn!("Ollama server (PID: {}) exited; starting a new one", existing.id());
            *child = None;
        }

        let program = self
            .host
            .locate_executable(self.config.ollama_bin.as_deref())
            .ok_or(StartupError::ExecutableNotFound)?;

        info!("Starting Ollama server...");
        let spawned = self
            .host
            .spawn(&program, &["serve"])
            .map_err(|e| match e {
                OllamaError::BinaryNotFound => StartupError::ExecutableNotFound,
                other => StartupError::SpawnFailed(other.to_string()),
            })?;

        debug!("Ollama server spawned with PID: {}", spawned.id());
        *child = Some(spawned);
        Ok(())
    }

    async fn wait_ready(&self) -> Result<(), StartupError> {
        let attempts = self.config.readiness_attempts;

        for attempt in 1..=attempts {
            if self.is_service_reachable().await {
                info!("Ollama is ready after {} attempts.", attempt);
                return Ok(());
            }
            if attempt < attempts {
                sleep(self.config.readiness_interval).await;
            }
        }

        warn!("Ollama did not become ready after {} attempts", attempts);
        Err(StartupError::Timeout { attempts })
    }

    /// Bounded readiness check; never fails.
    pub async fn is_service_reachable(&self) -> bool {
        self.client.is_reachable().await
    }

    /// Make sure `model` is present, pulling it if the listing lacks it.
    pub async fn ensure_model_loaded(&self, model: &str) -> ModelStatus {
        self.ensure_model_loaded_with_progress(model, |progress| {
            if let Some(status) = &progress.status {
                debug!("pull {}: {}", model, status);
            }
        })
        .await
    }

    /// As [`Self::ensure_model_loaded`], reporting pull progress.
    pub async fn ensure_model_loaded_with_progress<F>(&self, model: &str, on_progress: F) -> ModelStatus
    where
        F: FnMut(&PullProgress),
    {
        if !self.is_service_reachable().await {
            debug!("Ollama not reachable; skipping model check");
            return ModelStatus::NotReady;
        }

        match self.client.has_model(model).await {
            Ok(true) => ModelStatus::AlreadyPresent,
            Ok(false) => {
                info!("Model '{}' not found. Pulling the model...", model);
                match self.client.pull_model(model, on_progress).await {
                    Ok(()) => ModelStatus::FreshlyFetched,
                    Err(e) => {
                        warn!("Failed to pull {} model: {}", model, e);
                        ModelStatus::FetchFailed(e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!("Error checking model: {}", e);
                ModelStatus::QueryFailed(e.to_string())
            }
        }
    }

    /// Generate a writing prompt from `description` with `model`.
    ///
    /// Sends at most one generate request, and only after the model check
    /// permits it. No retry.
    pub async fn generate(&self, description: &str, model: &str) -> Result<String, GenerationError> {
        if prompt::is_blank(description) {
            return Err(GenerationError::EmptyInput);
        }

        let status = self.ensure_model_loaded(model).await;
        if !status.permits_generation() {
            return Err(GenerationError::ModelUnavailable {
                model: model.to_string(),
                status,
            });
        }

        let request = GenerateRequest {
            model: model.to_string(),
            prompt: prompt::build_generation_prompt(description),
            stream: false,
            options: self.config.sampling,
        };

        info!("Generating prompt with {}...", model);
        let response = self.client.generate(&request).await?;
        info!("Prompt generated successfully");

        Ok(response.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    /// Report process, reachability and model presence without changing
    /// anything.
    pub async fn status(&self) -> ServiceStatus {
        let process_active = self.host.is_process_active(&self.config.process_name);
        let reachable = self.is_service_reachable().await;
        let model_present = if reachable {
            self.client.has_model(&self.config.model).await.ok()
        } else {
            None
        };

        ServiceStatus {
            process_active,
            reachable,
            model_present,
        }
    }

    /// Stop the service if, and only if, this controller started it.
    pub fn shutdown(&self) {
        let child = self
            .child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match child {
            Some(mut child) => {
                if let Err(e) = child.terminate() {
                    warn!("Failed to stop Ollama server: {}", e);
                }
            }
            None => debug!("Ollama server not owned by this controller; leaving it running"),
        }
    }
}

impl Drop for ServiceReadinessController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permits_generation() {
        assert!(ModelStatus::AlreadyPresent.permits_generation());
        assert!(ModelStatus::FreshlyFetched.permits_generation());
        assert!(!ModelStatus::NotReady.permits_generation());
        assert!(!ModelStatus::FetchFailed("x".into()).permits_generation());
        assert!(!ModelStatus::QueryFailed("x".into()).permits_generation());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&Ok("Write about...".to_string())), "Write about...");
        assert_eq!(
            display_text(&Err(GenerationError::Timeout)),
            "Error: Request timed out. The model is taking too long to respond."
        );
        assert_eq!(
            display_text(&Err(GenerationError::Request("boom".into()))),
            "Error: boom"
        );
    }

    #[test]
    fn test_timeout_classification() {
        let e: GenerationError = OllamaError::Timeout("http://x".into()).into();
        assert_eq!(e, GenerationError::Timeout);

        let e: GenerationError = OllamaError::ServerNotRunning("http://x".into()).into();
        assert!(matches!(e, GenerationError::Request(msg) if msg.contains("not running")));
    }
}
