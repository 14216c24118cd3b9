//! Single-prompt/single-response backend, modeled on a `generateContent`
//! -shaped API (one request, one JSON body, no chat-turn framing). Multi
//! -turn `chat()` calls flatten the message list into one prompt since the
//! wire format has no native notion of roles.

use lexrag_core::{Message, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::LlmError;
use crate::gateway::{ChatOptions, Provider};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const NATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct NativeProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl NativeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client builds with static configuration");
        Self { client, api_key, model }
    }

    fn flatten(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| match m.role {
                Role::System => format!("[system]\n{}", m.content),
                Role::User => format!("[user]\n{}", m.content),
                Role::Assistant => format!("[assistant]\n{}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Serialize)]
struct NativeRequest {
    contents: Vec<NativeContent>,
    #[serde(rename = "generationConfig")]
    generation_config: NativeGenerationConfig,
}

#[derive(Serialize)]
struct NativeContent {
    parts: Vec<NativePart>,
}

#[derive(Serialize)]
struct NativePart {
    text: String,
}

#[derive(Serialize)]
struct NativeGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct NativeResponse {
    candidates: Vec<NativeCandidate>,
}

#[derive(Deserialize)]
struct NativeCandidate {
    content: NativeContentOut,
}

#[derive(Deserialize)]
struct NativeContentOut {
    parts: Vec<NativePartOut>,
}

#[derive(Deserialize)]
struct NativePartOut {
    text: String,
}

#[async_trait::async_trait]
impl Provider for NativeProvider {
    async fn generate(&self, prompt: &str, opts: ChatOptions) -> Result<String, LlmError> {
        let url = format!("{NATIVE_ENDPOINT}/{}:generateContent?key={}", self.model, self.api_key);
        let body = NativeRequest {
            contents: vec![NativeContent { parts: vec![NativePart { text: prompt.to_string() }] }],
            generation_config: NativeGenerationConfig {
                temperature: opts.temperature,
                max_output_tokens: opts.max_tokens,
            },
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| LlmError::Request {
            message: e.to_string(),
            url: url.clone(),
            is_timeout: e.is_timeout(),
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: "non-success response".to_string(),
                url,
                body_snippet: text.chars().take(300).collect(),
            });
        }

        let parsed: NativeResponse = serde_json::from_str(&text).map_err(|e| LlmError::Deserialization {
            message: e.to_string(),
            body_snippet: text.chars().take(300).collect(),
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::Deserialization {
                message: "no candidates in response".to_string(),
                body_snippet: text.chars().take(300).collect(),
            })
    }

    async fn chat(&self, messages: &[Message], opts: ChatOptions) -> Result<String, LlmError> {
        let prompt = Self::flatten(messages);
        self.generate(&prompt, opts).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
