//! Chat use case implementation.
//!
//! Answers follow-up questions against a stored analysis session: the user
//! message is appended first, the context is reassembled from the session,
//! and the provider reply (or an apology, when the provider fails) is
//! appended back.

use cuadre_core::error::{CuadreError, Result};
use cuadre_core::session::{ChatMessage, SessionStore, build_chat_context};
use cuadre_interaction::provider::AiProvider;
use cuadre_interaction::{chat_failure_message, parse_chat_response};
use std::sync::Arc;

/// Outcome of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub session_id: String,
    pub response: String,
    pub history: Vec<ChatMessage>,
}

/// Use case for chatting over a previous analysis.
pub struct ChatUseCase {
    provider: Arc<dyn AiProvider>,
    sessions: Arc<SessionStore>,
}

impl ChatUseCase {
    pub fn new(provider: Arc<dyn AiProvider>, sessions: Arc<SessionStore>) -> Self {
        Self { provider, sessions }
    }

    /// Handles one follow-up question.
    ///
    /// A provider transport failure does not fail the turn: the apology
    /// message becomes the assistant reply, so the conversation stays
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the session is absent or expired.
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<ChatOutcome> {
        // Append the user message first so the assembled context already
        // carries it in the recent history
        if !self
            .sessions
            .append_message(session_id, ChatMessage::user(message))
            .await
        {
            return Err(CuadreError::not_found("session", session_id));
        }

        let session = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| CuadreError::not_found("session", session_id))?;

        let context = build_chat_context(&session);
        let response = match self.provider.chat(&context, message).await {
            Ok(reply) => parse_chat_response(&reply),
            Err(err) => {
                tracing::error!(error = %err, session_id, "chat provider call failed");
                chat_failure_message(&err)
            }
        };

        self.sessions
            .append_message(session_id, ChatMessage::assistant(&response))
            .await;

        let history = self
            .sessions
            .get(session_id)
            .await
            .map(|s| s.conversation_history)
            .unwrap_or_default();

        Ok(ChatOutcome {
            session_id: session_id.to_string(),
            response,
            history,
        })
    }
}
