//! Chat-context assembly.
//!
//! Reconstructs a provider-ready textual context from a stored session:
//! original tabular data, the analysis outcome, and the most recent
//! conversation turns. Missing optional pieces become "No disponible"
//! placeholders; this function never fails.

use super::model::AnalysisSession;
use serde_json::Value;
use std::fmt::Write;

/// How many of the most recent conversation turns are carried into the
/// context.
const RECENT_TURNS: usize = 5;

const NOT_AVAILABLE: &str = "No disponible";

/// Builds the CONTEXT block for a follow-up chat prompt.
pub fn build_chat_context(session: &AnalysisSession) -> String {
    let result = &session.analysis_result;
    let mut context = String::new();

    let files = if session.file_names.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        session.file_names.join(", ")
    };
    let _ = writeln!(context, "ARCHIVOS ANALIZADOS: {files}");
    let _ = writeln!(
        context,
        "FECHA DEL ANÁLISIS: {}",
        session.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    let _ = writeln!(context, "\nDATOS ORIGINALES DEL EXCEL:");
    let _ = writeln!(context, "{}", or_not_available(&session.tabular_data));

    let _ = writeln!(context, "\nRESUMEN DEL ANÁLISIS REALIZADO:");
    let _ = writeln!(context, "{}", or_not_available(&result.summary));

    let _ = writeln!(context, "\nHALLAZGOS ENCONTRADOS:");
    for finding in &result.findings {
        let kind = if finding.kind.is_empty() {
            "info"
        } else {
            &finding.kind
        };
        let _ = writeln!(
            context,
            "- [{}] {}",
            kind.to_uppercase(),
            fallback(&finding.title, "Sin título")
        );
        let _ = writeln!(
            context,
            "  Ubicación: {}",
            fallback(&finding.location, "No especificada")
        );
        let _ = writeln!(
            context,
            "  Descripción: {}",
            fallback(&finding.description, "Sin descripción")
        );
        let _ = writeln!(
            context,
            "  Severidad: {}",
            fallback(&finding.severity, "medium")
        );
        let _ = writeln!(
            context,
            "  Solución sugerida: {}\n",
            fallback(&finding.suggested_fix, "No especificada")
        );
    }

    let _ = writeln!(context, "RECOMENDACIONES:");
    for rec in &result.recommendations {
        let _ = writeln!(
            context,
            "- {} (Prioridad: {})",
            fallback(&rec.title, "Sin título"),
            fallback(&rec.priority, "medium")
        );
        let _ = writeln!(
            context,
            "  {}\n",
            fallback(&rec.description, "Sin descripción")
        );
    }

    if !result.metadata.is_empty() {
        let _ = writeln!(context, "INFORMACIÓN ADICIONAL:");
        let _ = writeln!(
            context,
            "- Total de hallazgos: {}",
            count_of(&result.metadata, "total_findings")
        );
        let _ = writeln!(
            context,
            "- Problemas críticos: {}",
            count_of(&result.metadata, "critical_issues")
        );
        let _ = writeln!(
            context,
            "- Hojas analizadas: {}",
            count_of(&result.metadata, "sheets_analyzed")
        );
        if let Some(bancas) = string_list(&result.metadata, "non_profitable_bancas") {
            let _ = writeln!(context, "- Bancas no rentables: {bancas}");
        }
        if let Some(errors) = string_list(&result.metadata, "possible_config_errors") {
            let _ = writeln!(context, "- Posibles errores de configuración: {errors}");
        }
    }

    let _ = writeln!(context, "\nHISTORIAL DE CONVERSACIÓN RECIENTE:");
    let history = &session.conversation_history;
    let skip = history.len().saturating_sub(RECENT_TURNS);
    for message in &history[skip..] {
        let _ = writeln!(
            context,
            "{}: {}",
            message.role.display_name(),
            message.content
        );
    }

    context
}

fn or_not_available(value: &str) -> &str {
    fallback(value, NOT_AVAILABLE)
}

fn fallback<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn count_of(metadata: &serde_json::Map<String, Value>, key: &str) -> i64 {
    metadata.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn string_list(metadata: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    let items: Vec<&str> = metadata
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join(", "))
    }
}
