//! Decoding of provider replies.
//!
//! Analysis replies are expected to be a single JSON object, possibly
//! wrapped in a markdown code fence. Anything that cannot be decoded
//! becomes a well-formed failure result; this module never returns an
//! error and never panics on provider output.

use cuadre_core::analysis::{AnalysisResult, Finding, Recommendation};
use cuadre_core::error::CuadreError;
use serde_json::{Map, Value};

const DEFAULT_SUMMARY: &str = "Análisis completado";
const PARSE_FAILURE_ERROR: &str = "Error al parsear la respuesta del modelo";
const PARSE_FAILURE_SUMMARY: &str = "Error en el procesamiento de la respuesta";
const EMPTY_CHAT_REPLY: &str =
    "Lo siento, no recibí una respuesta del modelo. Por favor, inténtalo de nuevo.";

/// Parses a raw analysis reply into the strict result schema.
///
/// `provider` and `model` are injected into the result metadata and always
/// win over provider-supplied values for those two keys; every other
/// provider-supplied metadata key is kept as-is.
pub fn parse_analysis_response(raw: &str, provider: &str, model: &str) -> AnalysisResult {
    let cleaned = strip_code_fence(raw);

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, reply = cleaned, "analysis reply is not valid JSON");
            return parse_failure(provider, model, &err.to_string());
        }
    };

    let Some(object) = value.as_object() else {
        tracing::warn!(reply = cleaned, "analysis reply is not a JSON object");
        return parse_failure(provider, model, "la respuesta no es un objeto JSON");
    };

    let findings = object
        .get("findings")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_finding).collect())
        .unwrap_or_default();

    let recommendations = object
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_recommendation).collect())
        .unwrap_or_default();

    let mut metadata = object
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    metadata.insert("provider".to_string(), Value::String(provider.to_string()));
    metadata.insert("model".to_string(), Value::String(model.to_string()));

    AnalysisResult {
        // Absence of the field is not an error signal; explicit false wins
        success: object
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        summary: string_field(object, "summary", DEFAULT_SUMMARY),
        findings,
        recommendations,
        metadata,
        error: None,
    }
}

/// Normalizes a raw chat reply into user-visible text. Chat replies are
/// free text, not JSON; a blank reply degrades to an apology message.
pub fn parse_chat_response(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EMPTY_CHAT_REPLY.to_string();
    }
    trimmed.to_string()
}

/// The user-facing apology returned when the provider call itself failed
/// during chat.
pub fn chat_failure_message(error: &CuadreError) -> String {
    format!("Lo siento, ocurrió un error al procesar tu pregunta: {error}")
}

fn parse_finding(value: &Value) -> Option<Finding> {
    let object = value.as_object()?;
    Some(Finding {
        kind: string_field(object, "type", "info"),
        title: string_field(object, "title", ""),
        description: string_field(object, "description", ""),
        location: string_field(object, "location", ""),
        severity: string_field(object, "severity", "medium"),
        suggested_fix: string_field(object, "suggested_fix", ""),
    })
}

fn parse_recommendation(value: &Value) -> Option<Recommendation> {
    let object = value.as_object()?;
    Some(Recommendation {
        title: string_field(object, "title", ""),
        description: string_field(object, "description", ""),
        priority: string_field(object, "priority", "medium"),
        category: string_field(object, "category", "general"),
    })
}

fn string_field(object: &Map<String, Value>, key: &str, default: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn parse_failure(provider: &str, model: &str, parse_error: &str) -> AnalysisResult {
    let mut metadata = Map::new();
    metadata.insert("provider".to_string(), Value::String(provider.to_string()));
    metadata.insert("model".to_string(), Value::String(model.to_string()));
    metadata.insert(
        "parse_error".to_string(),
        Value::String(parse_error.to_string()),
    );

    AnalysisResult {
        success: false,
        summary: PARSE_FAILURE_SUMMARY.to_string(),
        findings: Vec::new(),
        recommendations: Vec::new(),
        metadata,
        error: Some(PARSE_FAILURE_ERROR.to_string()),
    }
}

/// Strips one leading/trailing triple-backtick fence (with or without a
/// `json` language tag). This is the only markdown unwrapping performed.
fn strip_code_fence(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    t.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_and_unfenced_replies_parse_identically() {
        let body = r#"{"summary": "Todo cuadra", "findings": [], "recommendations": []}"#;
        let fenced = format!("```json\n{body}\n```");

        let plain = parse_analysis_response(body, "openai", "gpt-4o");
        let wrapped = parse_analysis_response(&fenced, "openai", "gpt-4o");
        assert_eq!(plain, wrapped);
        assert_eq!(plain.summary, "Todo cuadra");
    }

    #[test]
    fn test_fence_without_language_tag() {
        let result = parse_analysis_response("```\n{\"success\": true}\n```", "gemini", "g");
        assert!(result.success);
    }

    #[test]
    fn test_garbage_yields_failure_shape_not_panic() {
        let result = parse_analysis_response("not json at all", "openai", "gpt-4o");
        assert!(!result.success);
        assert!(result.findings.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(result.error.is_some());
        assert!(result.metadata.contains_key("parse_error"));
        assert_eq!(result.metadata["provider"], "openai");
    }

    #[test]
    fn test_top_level_array_yields_failure_shape() {
        let result = parse_analysis_response(r#"[{"title": "T"}]"#, "openai", "gpt-4o");
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_finding_field_defaults() {
        let result =
            parse_analysis_response(r#"{"findings":[{"title":"T"}]}"#, "openai", "gpt-4o");
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.title, "T");
        assert_eq!(finding.kind, "info");
        assert_eq!(finding.severity, "medium");
        assert_eq!(finding.description, "");
        assert_eq!(finding.location, "");
        assert_eq!(finding.suggested_fix, "");
    }

    #[test]
    fn test_recommendation_field_defaults() {
        let result = parse_analysis_response(
            r#"{"recommendations":[{"title":"R"}]}"#,
            "gemini",
            "gemini-pro",
        );
        assert_eq!(result.recommendations.len(), 1);
        let rec = &result.recommendations[0];
        assert_eq!(rec.priority, "medium");
        assert_eq!(rec.category, "general");
    }

    #[test]
    fn test_malformed_findings_array_becomes_empty_list() {
        let result =
            parse_analysis_response(r#"{"findings": "no array"}"#, "openai", "gpt-4o");
        assert!(result.success);
        assert!(result.findings.is_empty());

        // Non-object elements are skipped, not fatal
        let result =
            parse_analysis_response(r#"{"findings": [42, {"title":"T"}]}"#, "openai", "gpt-4o");
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn test_success_defaults_true_explicit_false_wins() {
        let absent = parse_analysis_response("{}", "openai", "gpt-4o");
        assert!(absent.success);
        assert_eq!(absent.summary, DEFAULT_SUMMARY);

        let explicit = parse_analysis_response(r#"{"success": false}"#, "openai", "gpt-4o");
        assert!(!explicit.success);
    }

    #[test]
    fn test_metadata_merge_precedence() {
        let result = parse_analysis_response(
            r#"{"metadata": {"total_findings": 2, "provider": "spoofed"}}"#,
            "openai",
            "gpt-4o",
        );
        // Provider-supplied keys survive, but provider/model are always ours
        assert_eq!(result.metadata["total_findings"], 2);
        assert_eq!(result.metadata["provider"], "openai");
        assert_eq!(result.metadata["model"], "gpt-4o");
    }

    #[test]
    fn test_chat_response_is_trimmed_free_text() {
        assert_eq!(parse_chat_response("  hola  \n"), "hola");
        assert_eq!(parse_chat_response("   "), EMPTY_CHAT_REPLY);
    }

    #[test]
    fn test_chat_failure_message_mentions_cause() {
        let err = CuadreError::provider("connection refused");
        let message = chat_failure_message(&err);
        assert!(message.starts_with("Lo siento"));
        assert!(message.contains("connection refused"));
    }
}
