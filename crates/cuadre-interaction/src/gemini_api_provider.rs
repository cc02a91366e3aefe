//! GeminiProvider - Direct REST implementation for the Gemini
//! generateContent API.

use async_trait::async_trait;
use cuadre_core::error::{CuadreError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::prompts;
use crate::provider::{AiProvider, provider_http_error};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const ANALYSIS_TEMPERATURE: f32 = 0.2;
const ANALYSIS_MAX_TOKENS: u32 = 2048;
const CHAT_TEMPERATURE: f32 = 0.3;
const CHAT_MAX_TOKENS: u32 = 1024;
const TOP_P: f32 = 0.8;

/// Provider implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Creates a new provider with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn send_request(
        &self,
        prompt: String,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                top_p: TOP_P,
                max_output_tokens,
            },
        };

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| CuadreError::Provider {
                message: format!("Gemini API request failed: {err}"),
                status_code: None,
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            CuadreError::provider(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
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
                tracing::warn!(error = %err, "Gemini connection test failed");
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
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Combines every text part of the first candidate, tolerating the partial
/// response shapes the API is known to produce.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .map(|parts| {
            parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CuadreError::provider(
            "Gemini API returned no text in the response candidates",
        ));
    }
    Ok(text.trim().to_string())
}

fn map_http_error(status: StatusCode, body: String) -> CuadreError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());
    provider_http_error("gemini", status, message)
}
