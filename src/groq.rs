use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::TextBackend;
use crate::constants;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// OpenAI-compatible chat completion payloads
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    content: String,
}

/// Adapter for the Groq chat completions API.
pub struct GroqBackend {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    // Optional system message prepended to every chat.
    system_message: Option<String>,
}

impl GroqBackend {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            system_message: None,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            constants::GROQ_API_BASE,
            &constants::GROQ_API_KEY,
            constants::GROQ_MODEL,
        )
    }

    pub fn with_system_message(mut self, system_message: &str) -> Self {
        self.system_message = Some(system_message.to_string());
        self
    }
}

#[async_trait]
impl TextBackend for GroqBackend {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(&self, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            warn!("GROQ_API_KEY not set. Skipping Groq query.");
            return None;
        }

        let api_url = format!("{}/openai/v1/chat/completions", self.api_base);
        let mut messages = Vec::new();
        if let Some(system) = &self.system_message {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });

        let payload = ChatRequest {
            model: self.model.clone(),
            messages,
        };

        info!("Querying Groq model: {}", self.model);
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
                error!("Groq API request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            error!("Groq API request failed with status {}", response.status());
            return None;
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => match body.choices.into_iter().next() {
                Some(choice) => Some(choice.message.content.trim().to_string()),
                None => {
                    error!("Unexpected Groq response format: no choices");
                    None
                }
            },
            Err(e) => {
                error!("Failed to parse Groq response: {}", e);
                None
            }
        }
    }
}
