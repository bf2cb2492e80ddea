use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::TextBackend;
use crate::constants;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    message: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    text: String,
}

/// Adapter for the Cohere chat API, the last resort in the fallback chain.
pub struct CohereBackend {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl CohereBackend {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            constants::COHERE_API_BASE,
            &constants::COHERE_API_KEY,
            constants::COHERE_MODEL,
        )
    }
}

#[async_trait]
impl TextBackend for CohereBackend {
    fn name(&self) -> &'static str {
        "cohere"
    }

    async fn generate(&self, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            warn!("COHERE_API_KEY not set. Skipping Cohere query.");
            return None;
        }

        let api_url = format!("{}/v1/chat", self.api_base);
        let payload = ChatRequest {
            model: self.model.clone(),
            message: prompt.to_string(),
        };

        info!("Querying Cohere model: {}", self.model);
        let response = match self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Cohere API request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            error!("Cohere API request failed with status {}", response.status());
            return None;
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => Some(body.text.trim().to_string()),
            Err(e) => {
                error!("Failed to parse Cohere response: {}", e);
                None
            }
        }
    }
}
