//! Application layer for the cuadre accounting-analysis proxy.
//!
//! Provides the use cases that coordinate the domain and provider layers:
//! analysis of uploaded documents and follow-up chat over stored sessions.

pub mod analysis_usecase;
pub mod chat_usecase;

pub use analysis_usecase::{AnalysisOutcome, AnalysisUseCase};
pub use chat_usecase::{ChatOutcome, ChatUseCase};

use cuadre_interaction::provider::AiProvider;

/// Probes the provider once at startup and logs the outcome. A failed
/// probe is a degraded-service warning, never fatal.
pub async fn verify_provider(provider: &dyn AiProvider) -> bool {
    let reachable = provider.test_connection().await;
    if reachable {
        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            "AI provider connection established"
        );
    } else {
        tracing::warn!(
            provider = provider.name(),
            model = provider.model(),
            "AI provider connection could not be verified"
        );
    }
    reachable
}
