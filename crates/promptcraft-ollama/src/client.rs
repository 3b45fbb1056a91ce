//! HTTP client for the Ollama REST API.

use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OllamaError;
use crate::DEFAULT_OLLAMA_URL;

/// Time bounds applied to each class of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Readiness check against `/api/tags`.
    pub health: Duration,
    /// Model listing query.
    pub listing: Duration,
    /// Model pull; large transfers.
    pub pull: Duration,
    /// TCP connect for every request.
    pub connect: Duration,
    /// Waiting on a generation response.
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(5),
            listing: Duration::from_secs(10),
            pull: Duration::from_secs(600),
            connect: Duration::from_secs(30),
            read: Duration::from_secs(120),
        }
    }
}

/// Client for communicating with an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeouts: Timeouts,
}

/// Request to the Ollama generate API.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options sent with a generate request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub num_predict: i32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_predict: 100,
            temperature: 0.5,
            top_k: 30,
            top_p: 0.8,
        }
    }
}

/// Response from the Ollama generate API.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Response from the Ollama tags API (list models).
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

/// A model installed on the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Body of a pull request. Only the model name is sent.
#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
}

/// One line of the pull progress stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PullProgress {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Whether a name from `/api/tags` satisfies the wanted model.
///
/// An untagged name matches its `:latest` tag.
pub fn model_matches(listed: &str, wanted: &str) -> bool {
    if listed == wanted {
        return true;
    }
    !wanted.contains(':') && listed.strip_suffix(":latest") == Some(wanted)
}

impl OllamaClient {
    /// Create a client against the default local URL.
    pub fn new() -> Result<Self, OllamaError> {
        Self::with_url(DEFAULT_OLLAMA_URL, Timeouts::default())
    }

    /// Create a client with a custom URL and timeouts.
    pub fn with_url(base_url: impl Into<String>, timeouts: Timeouts) -> Result<Self, OllamaError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            timeouts,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured timeouts.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if the server is accepting requests.
    pub async fn check_health(&self) -> Result<(), OllamaError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.timeouts.health)
            .send()
            .await
            .map_err(|e| OllamaError::from_transport(e, &self.base_url))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(OllamaError::ServerNotRunning(self.base_url.clone()))
        }
    }

    /// Readiness check. Any failure counts as unreachable.
    pub async fn is_reachable(&self) -> bool {
        match self.check_health().await {
            Ok(()) => true,
            Err(e) => {
                debug!("Readiness check failed: {}", e);
                false
            }
        }
    }

    /// List the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<ModelEntry>, OllamaError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.timeouts.listing)
            .send()
            .await
            .map_err(|e| OllamaError::from_transport(e, &self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{}: {}", status, text)));
        }

        let body = response.text().await?;
        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models)
    }

    /// Check whether a model is installed.
    pub async fn has_model(&self, model: &str) -> Result<bool, OllamaError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| model_matches(&m.name, model)))
    }

    /// Pull a model, consuming the progress stream until the server closes it.
    ///
    /// `on_progress` sees every decoded progress line.
    pub async fn pull_model<F>(&self, model: &str, mut on_progress: F) -> Result<(), OllamaError>
    where
        F: FnMut(&PullProgress),
    {
        info!("Pulling model '{}' from {}", model, self.base_url);

        let response = self
            .client
            .post(self.url("/api/pull"))
            .json(&PullRequest { name: model })
            .timeout(self.timeouts.pull)
            .send()
            .await
            .map_err(|e| OllamaError::from_transport(e, &self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::PullFailed {
                model: model.to_string(),
                reason: format!("{}: {}", status, text.trim()),
            });
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| OllamaError::from_transport(e, &self.base_url))?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                handle_pull_line(model, &line, &mut on_progress)?;
            }
        }

        if !buffer.is_empty() {
            handle_pull_line(model, &buffer, &mut on_progress)?;
        }

        info!("Successfully pulled {} model", model);
        Ok(())
    }

    /// Send a non-streaming generate request.
    ///
    /// Returns `None` when the server answered without a `response` field.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, OllamaError> {
        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(request)
            .timeout(self.timeouts.read)
            .send()
            .await
            .map_err(|e| OllamaError::from_transport(e, &self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{}: {}", status, text.trim())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OllamaError::from_transport(e, &self.base_url))?;
        let response: GenerateResponse = serde_json::from_str(&body)?;

        if let Some(error) = response.error {
            return Err(OllamaError::Api(error));
        }

        Ok(response.response)
    }
}

fn handle_pull_line<F>(model: &str, line: &[u8], on_progress: &mut F) -> Result<(), OllamaError>
where
    F: FnMut(&PullProgress),
{
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<PullProgress>(line) {
        Ok(progress) => {
            if let Some(reason) = progress.error.clone() {
                return Err(OllamaError::PullFailed {
                    model: model.to_string(),
                    reason,
                });
            }
            on_progress(&progress);
        }
        Err(e) => debug!("Skipping undecodable pull line {:?}: {}", line, e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let client = OllamaClient::new().unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.timeouts().read, Duration::from_secs(120));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::with_url("http://192.168.1.100:8080/", Timeouts::default()).unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.100:8080");
        assert_eq!(client.url("/api/tags"), "http://192.168.1.100:8080/api/tags");
    }

    #[test]
    fn test_model_matching() {
        assert!(model_matches("tinyllama", "tinyllama"));
        assert!(model_matches("tinyllama:latest", "tinyllama"));
        assert!(!model_matches("tinyllama:1.1b", "tinyllama"));
        assert!(!model_matches("other-model", "tinyllama"));
        assert!(!model_matches("tinyllama:latest", "tinyllama:1.1b"));
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "tinyllama".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: GenerateOptions::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 100);
        assert_eq!(value["options"]["top_k"], 30);
    }

    #[test]
    fn test_pull_line_error_aborts() {
        let mut seen = Vec::new();
        let ok = handle_pull_line("m", br#"{"status":"pulling manifest"}"#, &mut |p: &PullProgress| {
            seen.push(p.status.clone())
        });
        assert!(ok.is_ok());
        assert_eq!(seen, vec![Some("pulling manifest".to_string())]);

        let err = handle_pull_line("m", br#"{"error":"file does not exist"}"#, &mut |_: &PullProgress| {});
        assert!(matches!(err, Err(OllamaError::PullFailed { ref reason, .. }) if reason == "file does not exist"));
    }

    #[test]
    fn test_pull_line_garbage_skipped() {
        let result = handle_pull_line("m", b"not json\n", &mut |_: &PullProgress| {
            panic!("no progress expected")
        });
        assert!(result.is_ok());
    }
}
