//! OpenAI-compatible chat/completions backend, for any router-style provider
//! (OpenRouter and similar) that speaks the `/chat/completions` wire format.
//!
//! Grounded on `ploke-llm/src/wire.rs`'s `build_openrouter_request` (base
//! URL joined with `chat/completions`, bearer auth, JSON body) and
//! `manager::RequestMessage`'s role/content message shape.

use lexrag_core::{Message, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::LlmError;
use crate::gateway::{ChatOptions, Provider};

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct OpenAiCompatProvider {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, LlmError> {
        let base = Url::parse(&base_url)
            .map_err(|e| LlmError::ConfigMissing(format!("invalid base url {base_url}: {e}")))?;
        let endpoint = base
            .join("chat/completions")
            .map_err(|e| LlmError::ConfigMissing(format!("cannot join chat/completions onto {base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builds with static configuration");
        Ok(Self { client, api_key, endpoint, model })
    }
}

#[derive(Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        let role = match m.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        WireMessage { role, content: m.content.clone() }
    }
}

#[derive(Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait::async_trait]
impl Provider for OpenAiCompatProvider {
    async fn generate(&self, prompt: &str, opts: ChatOptions) -> Result<String, LlmError> {
        let message = Message::user(prompt.to_string());
        self.chat(std::slice::from_ref(&message), opts).await
    }

    async fn chat(&self, messages: &[Message], opts: ChatOptions) -> Result<String, LlmError> {
        let body = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                message: e.to_string(),
                url: self.endpoint.to_string(),
                is_timeout: e.is_timeout(),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: "non-success response".to_string(),
                url: self.endpoint.to_string(),
                body_snippet: text.chars().take(300).collect(),
            });
        }

        let parsed: ChatCompletionsResponse = serde_json::from_str(&text).map_err(|e| LlmError::Deserialization {
            message: e.to_string(),
            body_snippet: text.chars().take(300).collect(),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Deserialization {
                message: "no choices in response".to_string(),
                body_snippet: text.chars().take(300).collect(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
