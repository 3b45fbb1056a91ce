//! Error types for Ollama operations.

use thiserror::Error;

/// Errors that can occur while talking to or managing the Ollama service.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error: {0}")]
    Api(String),

    /// Server answered the health check with an error status.
    #[error("Ollama server not running at {0}. Start it with: ollama serve")]
    ServerNotRunning(String),

    /// TCP connection to the server failed.
    #[error("Could not connect to Ollama at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded its time bound.
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// Pulling a model failed partway through the stream.
    #[error("Failed to pull model '{model}': {reason}")]
    PullFailed { model: String, reason: String },

    /// Server process could not be spawned.
    #[error("Failed to start server: {0}")]
    ServerStartFailed(String),

    /// Ollama binary not found.
    #[error("Ollama executable not found. Ensure it's installed and added to PATH")]
    BinaryNotFound,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OllamaError {
    /// Whether this error came from a connect or read deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Classify a transport error against `base_url`.
    pub(crate) fn from_transport(e: reqwest::Error, base_url: &str) -> Self {
        if e.is_timeout() {
            Self::Timeout(base_url.to_string())
        } else if e.is_connect() {
            Self::Connect {
                url: base_url.to_string(),
                source: e,
            }
        } else {
            Self::Http(e)
        }
    }
}
