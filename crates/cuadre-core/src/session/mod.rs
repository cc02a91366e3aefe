//! Session subsystem: conversation messages, the session model, the
//! in-memory store and the chat-context assembler.

pub mod context;
pub mod message;
pub mod model;
pub mod store;

pub use context::build_chat_context;
pub use message::{ChatMessage, ChatRole};
pub use model::{AnalysisSession, SessionSummary};
pub use store::SessionStore;
