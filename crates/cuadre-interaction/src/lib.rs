//! Provider layer for the cuadre accounting-analysis proxy.
//!
//! Defines the [`AiProvider`] capability, its OpenAI and Gemini REST
//! implementations, the prompt templates and the provider-response parser.

pub mod gemini_api_provider;
pub mod openai_api_provider;
pub mod prompts;
pub mod provider;
pub mod response_parser;

pub use gemini_api_provider::GeminiProvider;
pub use openai_api_provider::OpenAiProvider;
pub use prompts::{build_analysis_prompt, build_chat_prompt};
pub use provider::{AiProvider, provider_from_settings};
pub use response_parser::{chat_failure_message, parse_analysis_response, parse_chat_response};
