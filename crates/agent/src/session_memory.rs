//! Session memory assembler.
//!
//! Turns the durable history of a session into the per-request
//! `ConversationBuffer`. Appends only touch the buffer; persisting is the
//! orchestrator's job so that every store round trip lives in one place.

use concierge_core::error::StorageError;
use concierge_core::history::HistoryStore;
use concierge_core::message::{ConversationBuffer, Role, SessionId};
use std::sync::Arc;
use tracing::debug;

const PREVIEW_CHARS: usize = 50;

pub struct SessionMemory {
    store: Arc<dyn HistoryStore>,
}

impl SessionMemory {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Load a session's history into a fresh buffer, in store order.
    pub async fn load(&self, session_id: &SessionId) -> Result<ConversationBuffer, StorageError> {
        let messages = self.store.list(session_id.as_str()).await?;

        if messages.is_empty() {
            debug!(session_id = %session_id, "No prior history (first interaction)");
        } else {
            debug!(session_id = %session_id, messages = messages.len(), "Prior history loaded");
            let skip = messages.len().saturating_sub(2);
            for (i, m) in messages.iter().enumerate().skip(skip) {
                debug!(
                    index = i + 1,
                    role = m.role.as_str(),
                    preview = %preview(&m.content),
                    "History tail"
                );
            }
        }

        Ok(ConversationBuffer::from_history(session_id.clone(), messages))
    }

    pub fn append_user(&self, buffer: &mut ConversationBuffer, content: &str) {
        buffer.push_user(content);
    }

    pub fn append_assistant(&self, buffer: &mut ConversationBuffer, content: &str) {
        buffer.push_assistant(content);
    }

    /// Write one message through to the store.
    pub(crate) async fn persist(&self, session_id: &SessionId, role: Role, content: &str) -> Result<(), StorageError> {
        self.store.append(session_id.as_str(), role, content).await.map(|_| ())
    }
}

/// First 50 characters, with an ellipsis when truncated.
pub(crate) fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let head: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}
