//! In-memory session registry with lazy expiry.
//!
//! One exclusive lock guards the whole mapping; every operation takes it
//! for its full duration, so a reader can never observe a session
//! mid-append. Expired sessions are removed opportunistically on `create`
//! and `list` (and on direct lookups), never by a background timer.

use super::model::{AnalysisSession, SessionSummary};
use crate::analysis::AnalysisResult;
use crate::session::message::ChatMessage;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keyed registry of analysis sessions.
///
/// Not-found (including expired-and-swept) is a first-class return value
/// on every operation; nothing here returns an error.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, AnalysisSession>>,
    timeout: Duration,
}

impl SessionStore {
    /// Creates a store with the default 24-hour inactivity timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::hours(24))
    }

    /// Creates a store with a custom inactivity timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Stores a new session and returns its freshly generated id. Performs
    /// an expiry sweep before returning.
    pub async fn create(
        &self,
        analysis_result: AnalysisResult,
        tabular_data: String,
        file_names: Vec<String>,
    ) -> String {
        let session = AnalysisSession::new(analysis_result, tabular_data, file_names);
        let id = session.id.clone();

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), session);
        Self::sweep(&mut sessions, self.timeout);
        id
    }

    /// Looks up a session by id, refreshing its `last_activity` on success
    /// (read-extends-lease). An expired session is removed and reported as
    /// absent, indistinguishable from one that never existed.
    pub async fn get(&self, session_id: &str) -> Option<AnalysisSession> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();

        let session = sessions.get_mut(session_id)?;
        if now - session.last_activity > self.timeout {
            sessions.remove(session_id);
            return None;
        }

        session.last_activity = now;
        Some(session.clone())
    }

    /// Appends a message to a session's conversation history, refreshing
    /// `last_activity`. Returns `false` when the session is absent or
    /// expired.
    pub async fn append_message(&self, session_id: &str, message: ChatMessage) -> bool {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();

        let Some(session) = sessions.get_mut(session_id) else {
            return false;
        };
        if now - session.last_activity > self.timeout {
            sessions.remove(session_id);
            return false;
        }

        session.conversation_history.push(message);
        session.last_activity = now;
        true
    }

    /// Sweeps expired sessions, then returns a summary of every remaining
    /// one. No ordering is guaranteed.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let mut sessions = self.sessions.write().await;
        Self::sweep(&mut sessions, self.timeout);
        sessions.values().map(SessionSummary::from).collect()
    }

    /// Removes a session, returning whether it existed.
    pub async fn delete(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    fn sweep(sessions: &mut HashMap<String, AnalysisSession>, timeout: Duration) {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_activity <= timeout);

        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "swept expired sessions");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
