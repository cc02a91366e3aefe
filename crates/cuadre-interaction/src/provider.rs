//! The AI provider capability.
//!
//! Exactly one provider implementation is selected at startup from the
//! runtime settings and handed down to the use cases as a shared trait
//! object; there is no global "current provider" state.

use async_trait::async_trait;
use cuadre_core::config::{AiProviderKind, Settings};
use cuadre_core::error::{CuadreError, Result};
use std::sync::Arc;

use crate::gemini_api_provider::GeminiProvider;
use crate::openai_api_provider::OpenAiProvider;

/// Capability offered by an AI provider backend.
///
/// `analyze` and `chat` return the provider's raw reply text; decoding into
/// the structured schema is the response parser's job. Errors from these
/// calls are transport failures only.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name injected into result metadata ("openai",
    /// "gemini").
    fn name(&self) -> &'static str;

    /// The configured model identifier.
    fn model(&self) -> &str;

    /// Cheap connectivity probe. Failure is reported as `false`, never as
    /// an error; callers treat a failed probe as a degraded-service
    /// warning.
    async fn test_connection(&self) -> bool;

    /// Sends a fully built analysis prompt and returns the raw reply.
    async fn analyze(&self, prompt: &str) -> Result<String>;

    /// Answers a follow-up question against an assembled session context.
    async fn chat(&self, context: &str, message: &str) -> Result<String>;
}

/// Constructs the provider variant selected by the settings.
///
/// # Errors
///
/// Returns a `Config` error when the selected provider's API key is
/// missing.
pub fn provider_from_settings(settings: &Settings) -> Result<Arc<dyn AiProvider>> {
    settings.validate()?;

    match settings.provider {
        AiProviderKind::OpenAi => Ok(Arc::new(
            OpenAiProvider::new(&settings.openai_api_key, &settings.openai_model)
                .with_base_url(&settings.openai_base_url),
        )),
        AiProviderKind::Gemini => Ok(Arc::new(GeminiProvider::new(
            &settings.gemini_api_key,
            &settings.gemini_model,
        ))),
    }
}

/// Maps a non-success HTTP status to a provider error, classifying the
/// usual rate-limit and server statuses as retryable.
pub(crate) fn provider_http_error(
    provider: &str,
    status: reqwest::StatusCode,
    message: String,
) -> CuadreError {
    use reqwest::StatusCode;

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    CuadreError::Provider {
        message: format!("{provider}: {message}"),
        status_code: Some(status.as_u16()),
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuadre_core::config::{
        DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
        DEFAULT_SESSION_TIMEOUT_HOURS,
    };

    fn settings(provider: AiProviderKind) -> Settings {
        Settings {
            provider,
            openai_api_key: "sk-test".to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            gemini_api_key: "g-test".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            session_timeout_hours: DEFAULT_SESSION_TIMEOUT_HOURS,
        }
    }

    #[test]
    fn test_selects_variant_from_settings() {
        let openai = provider_from_settings(&settings(AiProviderKind::OpenAi)).unwrap();
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.model(), DEFAULT_OPENAI_MODEL);

        let gemini = provider_from_settings(&settings(AiProviderKind::Gemini)).unwrap();
        assert_eq!(gemini.name(), "gemini");
        assert_eq!(gemini.model(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_missing_key_is_a_config_error() {
        let mut bad = settings(AiProviderKind::Gemini);
        bad.gemini_api_key = String::new();
        let err = provider_from_settings(&bad).err().unwrap();
        assert!(matches!(err, CuadreError::Config(_)));
    }

    #[test]
    fn test_http_error_retryable_classification() {
        let retryable = provider_http_error(
            "openai",
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "rate limited".to_string(),
        );
        assert!(retryable.is_retryable());

        let fatal = provider_http_error(
            "openai",
            reqwest::StatusCode::UNAUTHORIZED,
            "bad key".to_string(),
        );
        assert!(!fatal.is_retryable());
        assert!(fatal.is_provider());
    }
}
