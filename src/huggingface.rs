use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::TextBackend;
use crate::constants;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    // Queue the request until the model is loaded instead of failing fast.
    wait_for_model: bool,
}

/// Adapter for the Hugging Face Inference API.
pub struct HuggingFaceBackend {
    client: Client,
    api_base: String,
    api_token: String,
    model_id: String,
}

impl HuggingFaceBackend {
    pub fn new(api_base: &str, api_token: &str, model_id: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.to_string(),
            api_token: api_token.to_string(),
            model_id: model_id.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            constants::HUGGINGFACE_API_BASE,
            &constants::HUGGINGFACE_API_TOKEN,
            constants::HUGGINGFACE_DEFAULT_MODEL,
        )
    }
}

#[async_trait]
impl TextBackend for HuggingFaceBackend {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str) -> Option<String> {
        if self.api_token.is_empty() {
            warn!("HUGGINGFACE_API_TOKEN not set. Skipping Hugging Face query.");
            return None;
        }

        let api_url = format!("{}/models/{}", self.api_base, self.model_id);
        let payload = InferenceRequest {
            inputs: prompt.to_string(),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        info!("Querying Hugging Face model: {}", self.model_id);
        let response = match self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Hugging Face API request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            error!(
                "Hugging Face API request failed with status {}",
                response.status()
            );
            return None;
        }

        // The success shape is a list of generations; an object with an
        // "error" field is the API's in-band failure report.
        let data = match response.json::<Value>().await {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to parse Hugging Face response: {}", e);
                return None;
            }
        };

        if let Some(err) = data.get("error") {
            error!("Hugging Face API error: {}", err);
            return None;
        }

        match data
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|first| first.get("generated_text"))
            .and_then(Value::as_str)
        {
            Some(text) => Some(text.trim().to_string()),
            None => {
                error!("Unexpected Hugging Face response format: {}", data);
                None
            }
        }
    }
}
