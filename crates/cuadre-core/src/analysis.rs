//! Structured analysis result schema.
//!
//! These types mirror the JSON contract the AI provider is instructed to
//! reply with. They are only ever constructed by the response parser (or
//! its failure path); fields the provider omitted get safe defaults there,
//! never invented values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single detected accounting issue with location and remediation
/// suggestion.
///
/// `kind` and `severity` are kept as plain strings because they carry
/// whatever the provider replied; the parser only fills in defaults
/// ("info" / "medium") when the field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// "error", "warning" or "info"
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    /// Location in the file (sheet and row when the provider names them)
    pub location: String,
    /// "high", "medium" or "low"
    pub severity: String,
    pub suggested_fix: String,
}

/// A general process/quality improvement suggestion, distinct from a
/// [`Finding`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    /// "high", "medium" or "low"
    pub priority: String,
    /// "calculation", "format", "process" or "validation"
    pub category: String,
}

/// The complete outcome of one analysis call.
///
/// `metadata` always carries `provider` and `model`; the rest of the map is
/// whatever the provider supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub summary: String,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
