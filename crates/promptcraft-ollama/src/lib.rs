//! Ollama backend for PromptCraft.
//!
//! This crate talks to a locally-hosted Ollama server over HTTP and, when
//! needed, starts the server process itself.

mod client;
mod error;
pub mod paths;
mod process;

pub use client::{
    model_matches, GenerateOptions, GenerateRequest, ModelEntry, OllamaClient, PullProgress,
    Timeouts,
};
pub use error::OllamaError;
pub use process::{ServiceChild, ServiceHost, SpawnedProcess, SystemHost};

/// Default Ollama server URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model for prompt generation.
pub const DEFAULT_MODEL: &str = "tinyllama";

/// Name fragment identifying a running Ollama process.
pub const DEFAULT_PROCESS_NAME: &str = "ollama";
