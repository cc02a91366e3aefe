//! Analysis use case implementation.
//!
//! Orchestrates the full analysis pipeline: tabular formatting, prompt
//! construction, the provider call, reply parsing and session creation.

use cuadre_core::analysis::AnalysisResult;
use cuadre_core::error::{CuadreError, Result};
use cuadre_core::session::SessionStore;
use cuadre_core::tabular::{SpreadsheetDocument, format_document, format_documents};
use cuadre_interaction::provider::AiProvider;
use cuadre_interaction::{build_analysis_prompt, parse_analysis_response};
use std::sync::Arc;

/// Outcome of one analysis call: the structured result plus the id of the
/// session created for follow-up chat.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub session_id: String,
    pub result: AnalysisResult,
}

/// Use case for analyzing uploaded spreadsheet documents.
///
/// Collaborators are injected once at construction; there is no global
/// provider or store state.
pub struct AnalysisUseCase {
    provider: Arc<dyn AiProvider>,
    sessions: Arc<SessionStore>,
}

impl AnalysisUseCase {
    pub fn new(provider: Arc<dyn AiProvider>, sessions: Arc<SessionStore>) -> Self {
        Self { provider, sessions }
    }

    /// Runs the analysis pipeline over one or more parsed files.
    ///
    /// Content-level provider problems (unparseable reply) resolve to a
    /// failure-shaped [`AnalysisResult`]; only transport failures surface
    /// as errors.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when no files were provided, or a single file could
    ///   not be formatted at all.
    /// - `Provider` when the provider call itself failed.
    pub async fn analyze(
        &self,
        files: Vec<(SpreadsheetDocument, String)>,
        custom_prompt: Option<&str>,
    ) -> Result<AnalysisOutcome> {
        if files.is_empty() {
            return Err(CuadreError::invalid_input(
                "No se proporcionaron archivos para analizar",
            ));
        }

        let file_names: Vec<String> = files.iter().map(|(_, name)| name.clone()).collect();
        let tabular_data = if files.len() == 1 {
            let (document, filename) = &files[0];
            format_document(document, filename)?
        } else {
            format_documents(&files)
        };

        let prompt = build_analysis_prompt(&tabular_data, custom_prompt);
        let reply = self.provider.analyze(&prompt).await?;
        let result = parse_analysis_response(&reply, self.provider.name(), self.provider.model());

        tracing::info!(
            provider = self.provider.name(),
            findings = result.findings.len(),
            success = result.success,
            "analysis completed"
        );

        let session_id = self
            .sessions
            .create(result.clone(), tabular_data, file_names)
            .await;

        Ok(AnalysisOutcome { session_id, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingProvider, MockProvider};
    use cuadre_core::tabular::Sheet;

    fn sample_files() -> Vec<(SpreadsheetDocument, String)> {
        let document = SpreadsheetDocument::new(vec![Sheet::new(
            "Hoja1",
            vec![
                vec!["Concepto".into(), "Debe".into(), "Haber".into()],
                vec!["Caja".into(), 100.into(), 0.into()],
            ],
        )]);
        vec![(document, "libro.xlsx".to_string())]
    }

    #[tokio::test]
    async fn test_end_to_end_analysis_creates_session() {
        let provider = Arc::new(MockProvider::new(
            r#"{
                "success": true,
                "summary": "Un hallazgo",
                "findings": [{"type": "error", "title": "Descuadre", "location": "Hoja1, fila 2", "severity": "high"}],
                "recommendations": [{"title": "Validar", "priority": "high", "category": "validation"}],
                "metadata": {"total_findings": 1}
            }"#,
        ));
        let sessions = Arc::new(SessionStore::new());
        let usecase = AnalysisUseCase::new(provider.clone(), sessions.clone());

        let outcome = usecase.analyze(sample_files(), None).await.unwrap();

        assert!(outcome.result.success);
        assert_eq!(outcome.result.findings.len(), 1);
        assert_eq!(outcome.result.recommendations.len(), 1);
        assert_eq!(outcome.result.metadata["provider"], "mock");

        // The prompt embedded the formatted grid
        let prompt = provider.last_prompt();
        assert!(prompt.contains("Fila 2: Col1: Caja | Col2: 100 | Col3: 0"));

        // A session was created holding the result and the tabular text
        let session = sessions.get(&outcome.session_id).await.unwrap();
        assert_eq!(session.analysis_result, outcome.result);
        assert_eq!(session.file_names, vec!["libro.xlsx".to_string()]);
        assert!(session.tabular_data.contains("=== ANÁLISIS DE ARCHIVO: libro.xlsx ==="));
    }

    #[tokio::test]
    async fn test_custom_prompt_reaches_provider() {
        let provider = Arc::new(MockProvider::new("{}"));
        let usecase = AnalysisUseCase::new(provider.clone(), Arc::new(SessionStore::new()));

        usecase
            .analyze(sample_files(), Some("Revisa las comisiones"))
            .await
            .unwrap();

        assert!(
            provider
                .last_prompt()
                .contains("INSTRUCCIONES ADICIONALES: Revisa las comisiones")
        );
    }

    #[tokio::test]
    async fn test_unparseable_reply_becomes_failure_result_not_error() {
        let provider = Arc::new(MockProvider::new("esto no es JSON"));
        let usecase = AnalysisUseCase::new(provider, Arc::new(SessionStore::new()));

        let outcome = usecase.analyze(sample_files(), None).await.unwrap();
        assert!(!outcome.result.success);
        assert!(outcome.result.error.is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let usecase =
            AnalysisUseCase::new(Arc::new(FailingProvider), Arc::new(SessionStore::new()));

        let err = usecase.analyze(sample_files(), None).await.unwrap_err();
        assert!(err.is_provider());
    }

    #[tokio::test]
    async fn test_no_files_is_invalid_input() {
        let usecase =
            AnalysisUseCase::new(Arc::new(MockProvider::new("{}")), Arc::new(SessionStore::new()));

        let err = usecase.analyze(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, CuadreError::InvalidInput(_)));
    }
}
