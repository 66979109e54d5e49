//! History store trait: the durable, append-only log of session messages.
//!
//! The store is the only authoritative copy of a conversation. Everything the
//! router knows about earlier turns is reloaded from here on each request.

use async_trait::async_trait;
use crate::error::StorageError;
use crate::message::{Message, Role};

/// The core HistoryStore trait.
///
/// Implementations: SQLite, in-memory (for testing and ephemeral runs).
///
/// All operations must be safe to call concurrently for different sessions.
/// For the same session an implementation only has to keep timestamps
/// strictly increasing in append order; serialising whole turns is the
/// orchestrator's job.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Append one message and return it as stored (with its timestamp).
    ///
    /// On error the caller must assume nothing was written.
    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> std::result::Result<Message, StorageError>;

    /// All messages of a session in creation order. Unknown sessions yield an
    /// empty vector.
    async fn list(&self, session_id: &str) -> std::result::Result<Vec<Message>, StorageError>;

    /// Remove every message of a session atomically and return how many were
    /// deleted. Clearing an unknown session succeeds with zero.
    async fn clear(&self, session_id: &str) -> std::result::Result<usize, StorageError>;
}
