//! # PromptCraft
//!
//! Writing-prompt generation backed by a locally-hosted Ollama server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────────┐     ┌─────────────────┐
//! │  Interactive    │ --> │  GenerationWorker    │ --> │ ServiceReadiness│
//! │  thread         │ <-- │  (one in flight)     │     │ Controller      │
//! └─────────────────┘     └──────────────────────┘     └────────┬────────┘
//!                                                               │
//!                                                  ┌────────────┴───────────┐
//!                                                  │ ollama serve + HTTP API│
//!                                                  └────────────────────────┘
//! ```
//!
//! The controller owns the bootstrap sequence: start the server if no
//! process is running, poll until it answers, make sure the model is
//! present, and only then send a generate request.
//!
//! ## Usage
//!
//! ```ignore
//! use promptcraft_ai::{PromptCraftConfig, ServiceReadinessController};
//!
//! let controller = ServiceReadinessController::new(PromptCraftConfig::from_env())?;
//! controller.bootstrap().await?;
//! let text = controller.generate("a lighthouse keeper", "tinyllama").await;
//! ```

mod config;
mod controller;
pub mod prompt;
mod worker;

pub use config::{PromptCraftConfig, PromptCraftConfigBuilder};
pub use controller::{
    display_text, GenerationError, ModelStatus, ServiceReadinessController, ServiceStatus,
    StartupError, NO_RESPONSE,
};
pub use worker::{GenerationCompleted, GenerationWorker, SubmitError};

// Re-export backend types for convenience
pub use promptcraft_ollama::{
    paths as ollama_paths, GenerateOptions, GenerateRequest, ModelEntry, OllamaClient,
    OllamaError, PullProgress, ServiceChild, ServiceHost, SystemHost, Timeouts, DEFAULT_MODEL,
    DEFAULT_OLLAMA_URL,
};
