//! Session orchestrator: the single entry point for a chat turn.
//!
//! A turn runs `received → classified → dispatched → replied` while holding
//! the session's lock, so two turns of one session never interleave their
//! history reads and writes. Every branch, including failures, ends with a
//! persisted, non-empty reply.

use concierge_core::error::StorageError;
use concierge_core::history::HistoryStore;
use concierge_core::intent::Intent;
use concierge_core::message::{Message, Role, SessionId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, warn};

use crate::classifier::IntentClassifier;
use crate::dispatcher::Dispatcher;
use crate::enricher::ContextEnricher;
use crate::session_memory::{SessionMemory, preview};

/// Result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub session_id: SessionId,
    pub intent: Intent,
}

/// Table size below which dead entries are left alone.
const SWEEP_THRESHOLD: usize = 1024;

/// One async mutex per live session.
///
/// Entries are weak so a session nobody is working on holds no mutex. A
/// dead entry is replaced when its session comes back; the whole table is
/// only swept once it reaches twice the live count left by the previous
/// sweep.
pub struct SessionLocks {
    table: Mutex<LockTable>,
}

struct LockTable {
    locks: HashMap<String, Weak<tokio::sync::Mutex<()>>>,
    sweep_at: usize,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::with_sweep_threshold(SWEEP_THRESHOLD)
    }

    fn with_sweep_threshold(threshold: usize) -> Self {
        Self {
            table: Mutex::new(LockTable {
                locks: HashMap::new(),
                sweep_at: threshold.max(1),
            }),
        }
    }

    /// Wait for exclusive access to a session.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            if table.locks.len() >= table.sweep_at {
                table.locks.retain(|_, weak| weak.strong_count() > 0);
                table.sweep_at = (table.locks.len() * 2).max(table.sweep_at);
            }
            let locks = &mut table.locks;
            match locks.get(session_id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(tokio::sync::Mutex::new(()));
                    locks.insert(session_id.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    /// Number of sessions currently holding or waiting on a lock.
    pub fn active(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .locks
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .locks
            .len()
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SessionOrchestrator {
    store: Arc<dyn HistoryStore>,
    memory: SessionMemory,
    classifier: IntentClassifier,
    enricher: ContextEnricher,
    dispatcher: Dispatcher,
    locks: SessionLocks,
}

impl SessionOrchestrator {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        classifier: IntentClassifier,
        enricher: ContextEnricher,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            memory: SessionMemory::new(store.clone()),
            store,
            classifier,
            enricher,
            dispatcher,
            locks: SessionLocks::new(),
        }
    }

    /// Name of the history backend (for health output).
    pub fn history_backend(&self) -> &str {
        self.store.name()
    }

    /// Process one user turn. Never fails: every error becomes the reply.
    pub async fn submit_turn(&self, session_id: Option<&str>, message: &str) -> TurnOutcome {
        let session_id = SessionId::resolve(session_id);
        let _guard = self.locks.acquire(session_id.as_str()).await;

        info!(session_id = %session_id, message = %preview(message), "Turn received");

        let mut buffer = match self.memory.load(&session_id).await {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "History unavailable, continuing without it");
                concierge_core::ConversationBuffer::new(session_id.clone())
            }
        };

        if let Err(e) = self.memory.persist(&session_id, Role::User, message).await {
            warn!(session_id = %session_id, error = %e, "User turn not persisted, durability lost");
        }

        self.memory.append_user(&mut buffer, message);

        let intent = match self.classifier.classify(message, buffer.prior_turns()).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Classification failed");
                Intent::Error
            }
        };
        info!(session_id = %session_id, intent = %intent, "Turn classified");

        let enriched = match intent.capability() {
            Some(capability) => self.enricher.enrich(buffer.prior_turns(), message, capability),
            None => message.to_string(),
        };

        let reply = self.dispatcher.dispatch(intent, &enriched, &buffer).await;

        self.memory.append_assistant(&mut buffer, &reply.text);
        if let Err(e) = self.memory.persist(&session_id, Role::Assistant, &reply.text).await {
            error!(session_id = %session_id, error = %e, "Reply not persisted");
        }

        info!(
            session_id = %session_id,
            intent = %intent,
            kind = ?reply.kind,
            reply = %preview(&reply.text),
            "Turn replied"
        );

        TurnOutcome {
            reply: reply.text,
            session_id,
            intent,
        }
    }

    /// All messages of a session in creation order.
    pub async fn get_history(&self, session_id: &str) -> Result<Vec<Message>, StorageError> {
        self.store.list(session_id).await
    }

    /// Delete a session's history; waits for any turn in flight.
    pub async fn clear_history(&self, session_id: &str) -> Result<usize, StorageError> {
        let _guard = self.locks.acquire(session_id).await;
        let deleted = self.store.clear(session_id).await?;
        info!(session_id, deleted, "History cleared");
        Ok(deleted)
    }
}
