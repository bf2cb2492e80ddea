use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::TextBackend;
use crate::constants;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

// Structures matching Ollama's /api/generate endpoint
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool, // We want the full response, not a stream
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String, // The generated text
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

/// Adapter for a locally hosted Ollama server.
///
/// The server is probed exactly once at startup; if it is unreachable or the
/// configured model is not installed, the adapter stays disabled for the rest
/// of the process and every call returns `None` without touching the network.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    // None means the probe failed and the backend is permanently disabled.
    model: Option<String>,
}

impl OllamaBackend {
    /// Probe the server at `base_url` and build the adapter, disabled when the
    /// server or the model is missing.
    pub async fn probe(base_url: &str, model: &str) -> Self {
        let client = Client::new();
        let model = check_server(&client, base_url, model).await;
        Self {
            client,
            base_url: base_url.to_string(),
            model,
        }
    }

    /// Probe using the configured `OLLAMA_URL` / `OLLAMA_MODEL`.
    pub async fn from_env() -> Self {
        Self::probe(&constants::OLLAMA_URL, &constants::OLLAMA_MODEL).await
    }

    /// Build an adapter that skips the probe entirely (already known state).
    pub fn with_model(base_url: &str, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            model,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }
}

/// Check that the Ollama server is reachable and that `model` is installed.
/// Returns the model name to use, or `None` to disable the backend.
async fn check_server(client: &Client, base_url: &str, model: &str) -> Option<String> {
    info!("Attempting to connect to Ollama server at {}...", base_url);

    if let Err(e) = client.get(base_url).timeout(PROBE_TIMEOUT).send().await {
        warn!(
            "Ollama server not reachable at {}: {}. Disabling Ollama functionality.",
            base_url, e
        );
        return None;
    }
    info!("Ollama server is reachable.");

    let tags_url = format!("{}/api/tags", base_url);
    let tags = match client.get(&tags_url).timeout(PROBE_TIMEOUT).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<TagsResponse>().await {
            Ok(tags) => tags,
            Err(e) => {
                warn!(
                    "Could not parse Ollama model list: {}. Disabling Ollama functionality.",
                    e
                );
                return None;
            }
        },
        Ok(resp) => {
            warn!(
                "Ollama model list request failed with status {}. Disabling Ollama functionality.",
                resp.status()
            );
            return None;
        }
        Err(e) => {
            warn!(
                "Failed to list Ollama models: {}. Disabling Ollama functionality.",
                e
            );
            return None;
        }
    };

    let available: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
    if available.iter().any(|name| name == model) {
        info!("Configured Ollama model '{}' is available.", model);
        Some(model.to_string())
    } else {
        warn!(
            "Configured Ollama model '{}' not found on server. Available models: {}",
            model,
            if available.is_empty() {
                "None".to_string()
            } else {
                available.join(", ")
            }
        );
        None
    }
}

#[async_trait]
impl TextBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Option<String> {
        let model = match &self.model {
            Some(model) => model.clone(),
            None => {
                info!("Ollama is disabled or unavailable. Skipping Ollama query.");
                return None;
            }
        };

        let api_url = format!("{}/api/generate", self.base_url);
        let payload = OllamaRequest {
            model: model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        info!("Querying Ollama model: {}", model);
        let response = match self
            .client
            .post(&api_url)
            .timeout(GENERATE_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Ollama API request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!("Ollama API request failed with status {}: {}", status, error_body);
            return None;
        }

        match response.json::<OllamaResponse>().await {
            Ok(body) => Some(body.response.trim().to_string()),
            Err(e) => {
                error!("Unexpected Ollama response format: {}", e);
                None
            }
        }
    }
}
