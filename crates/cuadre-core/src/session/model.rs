//! Analysis session domain model.
//!
//! A session ties one analysis result to its follow-up conversation. It
//! lives only in process memory and is owned exclusively by the
//! [`SessionStore`](super::store::SessionStore).

use super::message::ChatMessage;
use crate::analysis::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An in-memory analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    /// Unique session identifier (UUID v4)
    pub id: String,
    /// The structured result the session was created from
    pub analysis_result: AnalysisResult,
    /// The formatted tabular text that was sent to the provider
    pub tabular_data: String,
    /// Display names of the analyzed files
    pub file_names: Vec<String>,
    /// Follow-up conversation, in insertion order
    pub conversation_history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every read and every append; drives expiry
    pub last_activity: DateTime<Utc>,
}

impl AnalysisSession {
    /// Creates a fresh session with a new id, empty conversation history
    /// and current timestamps.
    pub fn new(
        analysis_result: AnalysisResult,
        tabular_data: String,
        file_names: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            analysis_result,
            tabular_data,
            file_names,
            conversation_history: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }
}

/// The lightweight view returned by [`SessionStore::list`](super::store::SessionStore::list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub file_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: usize,
}

impl From<&AnalysisSession> for SessionSummary {
    fn from(session: &AnalysisSession) -> Self {
        Self {
            id: session.id.clone(),
            file_names: session.file_names.clone(),
            created_at: session.created_at,
            last_activity: session.last_activity,
            message_count: session.conversation_history.len(),
        }
    }
}
