//! The routing core of Concierge.
//!
//! A chat turn flows through:
//!
//! 1. **Load** the session's history into a conversation buffer
//! 2. **Persist** the user turn
//! 3. **Classify** the turn as `create` or `query` (history-aware, with a
//!    history-free fallback)
//! 4. **Enrich** the message with the prior turns
//! 5. **Dispatch** to the matching capability agent
//! 6. **Persist** and return the reply
//!
//! Turns of the same session are serialized; any failure along the way
//! becomes the reply instead of an error.

pub mod bootstrap;
pub mod classifier;
pub mod dispatcher;
pub mod enricher;
pub mod orchestrator;
pub mod prompts;
pub mod session_memory;
pub mod tool_agent;

#[cfg(any(test, feature = "test-util"))]
pub mod test_helpers;

pub use bootstrap::{Stores, build_orchestrator, open_stores};
pub use classifier::IntentClassifier;
pub use dispatcher::{Dispatcher, Reply, ReplyKind};
pub use enricher::ContextEnricher;
pub use orchestrator::{SessionLocks, SessionOrchestrator, TurnOutcome};
pub use session_memory::SessionMemory;
pub use tool_agent::ToolAgent;
