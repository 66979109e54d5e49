//! Dispatcher: maps a classified intent to a reply.
//!
//! Routable intents invoke their capability agent under a timeout; every
//! other outcome is a fixed reply. Dispatch never fails.

use concierge_core::agent::CapabilityAgent;
use concierge_core::error::AgentError;
use concierge_core::intent::{Capability, Intent, Locale};
use concierge_core::message::ConversationBuffer;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::prompts;

/// How a reply came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Output of a capability agent
    Agent,
    /// A capability agent failed or timed out
    AgentError,
    /// The intent was not recognised
    Clarification,
    /// Classification itself failed
    Apology,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
}

pub struct Dispatcher {
    agents: HashMap<Capability, Arc<dyn CapabilityAgent>>,
    agent_timeout: Duration,
    locale: Locale,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
            agent_timeout: Duration::from_secs(120),
            locale: Locale::default(),
        }
    }

    /// Register the agent for its capability, replacing any previous one.
    pub fn with_agent(mut self, agent: Arc<dyn CapabilityAgent>) -> Self {
        self.agents.insert(agent.capability(), agent);
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub async fn dispatch(
        &self,
        intent: Intent,
        enriched_input: &str,
        session_memory: &ConversationBuffer,
    ) -> Reply {
        let capability = match intent {
            Intent::Create => Capability::Create,
            Intent::Query => Capability::Query,
            Intent::Unknown => {
                info!(session_id = %session_memory.session_id(), "Intent not recognised");
                return Reply {
                    text: prompts::clarification(self.locale).to_string(),
                    kind: ReplyKind::Clarification,
                };
            }
            Intent::Error => {
                return Reply {
                    text: prompts::apology(self.locale).to_string(),
                    kind: ReplyKind::Apology,
                };
            }
        };

        match self.run_agent(capability, enriched_input, session_memory).await {
            Ok(text) => Reply {
                text,
                kind: ReplyKind::Agent,
            },
            Err(error) => {
                warn!(
                    session_id = %session_memory.session_id(),
                    capability = %capability,
                    error = %error,
                    "Capability agent failed"
                );
                Reply {
                    text: prompts::agent_error(capability, self.locale, &error),
                    kind: ReplyKind::AgentError,
                }
            }
        }
    }

    async fn run_agent(
        &self,
        capability: Capability,
        enriched_input: &str,
        session_memory: &ConversationBuffer,
    ) -> Result<String, String> {
        let agent = self
            .agents
            .get(&capability)
            .ok_or_else(|| format!("no agent registered for '{capability}'"))?;

        let output = tokio::time::timeout(self.agent_timeout, agent.invoke(enriched_input, session_memory))
            .await
            .unwrap_or_else(|_| {
                Err(AgentError::Timeout {
                    capability,
                    secs: self.agent_timeout.as_secs(),
                })
            })
            .map_err(|e| e.to_string())?;

        if output.trim().is_empty() {
            return Err("the model returned an empty answer".into());
        }
        Ok(output)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
