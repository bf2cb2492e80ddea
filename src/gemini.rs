use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::TextBackend;
use crate::constants;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// Structures matching the generateContent REST endpoint
#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: String,
}

/// Adapter for Google Gemini, the primary cloud backend.
///
/// This is the only backend whose credential is a hard startup requirement:
/// it also serves the validator's repair pass, the analysis and conclusion
/// prompts, and the debate's "against" persona.
pub struct GeminiBackend {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
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
            constants::GEMINI_API_BASE,
            &constants::GEMINI_API_KEY,
            constants::GEMINI_MODEL,
        )
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            warn!("GEMINI_API_KEY not set. Skipping Gemini query.");
            return None;
        }

        let api_url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );
        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        info!("Querying Gemini model...");
        let response = match self
            .client
            .post(&api_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Gemini API request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            error!("Gemini API request failed with status {}", response.status());
            return None;
        }

        let body = match response.json::<GenerateContentResponse>().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to parse Gemini response: {}", e);
                return None;
            }
        };

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string());
        if text.is_none() {
            error!("Unexpected Gemini response format: no candidate text");
        }
        text
    }
}
