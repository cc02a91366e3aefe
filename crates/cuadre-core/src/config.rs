//! Runtime settings loaded from the process environment.
//!
//! Settings are read once at startup and handed down to whoever needs them;
//! there is no global mutable configuration state.

use crate::error::{CuadreError, Result};
use std::env;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_SESSION_TIMEOUT_HOURS: i64 = 24;

/// Which AI provider variant to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProviderKind {
    OpenAi,
    Gemini,
}

impl AiProviderKind {
    /// Parses the `AI_PROVIDER` environment value. Unknown values fall back
    /// to OpenAI, matching the original proxy's behavior.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Self::Gemini,
            _ => Self::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

/// Process-wide runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: AiProviderKind,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub session_timeout_hours: i64,
}

impl Settings {
    /// Loads settings from environment variables, reading a `.env` file
    /// first if one is present.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the API key for the selected provider
    /// is missing.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let provider = AiProviderKind::parse(&env::var("AI_PROVIDER").unwrap_or_default());

        let settings = Self {
            provider,
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            session_timeout_hours: env::var("SESSION_TIMEOUT_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TIMEOUT_HOURS),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the selected provider has its API key configured.
    pub fn validate(&self) -> Result<()> {
        match self.provider {
            AiProviderKind::OpenAi if self.openai_api_key.is_empty() => Err(CuadreError::config(
                "OPENAI_API_KEY no está configurada en las variables de entorno",
            )),
            AiProviderKind::Gemini if self.gemini_api_key.is_empty() => Err(CuadreError::config(
                "GEMINI_API_KEY no está configurada en las variables de entorno",
            )),
            _ => Ok(()),
        }
    }
}
