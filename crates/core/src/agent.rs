//! Capability agent trait.

use async_trait::async_trait;
use crate::error::AgentError;
use crate::intent::Capability;
use crate::message::ConversationBuffer;

/// A collaborator that performs one category of action given an enriched
/// natural-language instruction.
///
/// Agents hold no per-session state: the session's buffer is handed in on
/// every call, so one instance can serve all sessions.
#[async_trait]
pub trait CapabilityAgent: Send + Sync {
    /// Which capability this agent implements.
    fn capability(&self) -> Capability;

    /// Run the agent and return its textual output.
    async fn invoke(
        &self,
        enriched_input: &str,
        session_memory: &ConversationBuffer,
    ) -> std::result::Result<String, AgentError>;
}
