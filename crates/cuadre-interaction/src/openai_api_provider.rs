//! OpenAiProvider - Direct REST implementation for the OpenAI
//! Chat Completions API.

use async_trait::async_trait;
use cuadre_core::config::DEFAULT_OPENAI_BASE_URL;
use cuadre_core::error::{CuadreError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::prompts;
use crate::provider::{AiProvider, provider_http_error};

const ANALYSIS_TEMPERATURE: f32 = 0.2;
const ANALYSIS_MAX_TOKENS: u32 = 2048;
const CHAT_TEMPERATURE: f32 = 0.3;
const CHAT_MAX_TOKENS: u32 = 1024;

/// Provider implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Creates a new provider with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (for proxies or compatible endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(
        &self,
        prompt: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![RequestMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| CuadreError::Provider {
                message: format!("OpenAI API request failed: {err}"),
                status_code: None,
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            CuadreError::provider(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn test_connection(&self) -> bool {
        match self
            .send_request(prompts::CONNECTION_PROBE.to_string(), CHAT_TEMPERATURE, 10)
            .await
        {
            Ok(reply) => reply.to_lowercase().contains("exitosa"),
            Err(err) => {
                tracing::warn!(error = %err, "OpenAI connection test failed");
                false
            }
        }
    }

    async fn analyze(&self, prompt: &str) -> Result<String> {
        self.send_request(prompt.to_string(), ANALYSIS_TEMPERATURE, ANALYSIS_MAX_TOKENS)
            .await
    }

    async fn chat(&self, context: &str, message: &str) -> Result<String> {
        let prompt = prompts::build_chat_prompt(context, message);
        self.send_request(prompt, CHAT_TEMPERATURE, CHAT_MAX_TOKENS)
            .await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<RequestMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            CuadreError::provider("OpenAI API returned no content in the response")
        })
}

fn map_http_error(status: StatusCode, body: String) -> CuadreError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    provider_http_error("openai", status, message)
}
