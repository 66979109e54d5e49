//! Context enricher.
//!
//! Capability agents get a single instruction string. When the session has
//! earlier turns, they are rendered in front of the current message so the
//! agent can pick up details (a name, an email, a filter) given before.

use concierge_core::intent::{Capability, Locale};
use concierge_core::message::{Message, Role};
use tracing::debug;

use crate::prompts::EnrichmentLabels;

pub struct ContextEnricher {
    labels: EnrichmentLabels,
}

impl ContextEnricher {
    pub fn new(locale: Locale) -> Self {
        Self {
            labels: EnrichmentLabels::for_locale(locale),
        }
    }

    /// Build the agent input. `prior_turns` must not contain the current turn.
    ///
    /// With no prior turns the current message is returned unchanged.
    pub fn enrich(&self, prior_turns: &[Message], current_message: &str, purpose: Capability) -> String {
        if prior_turns.is_empty() {
            return current_message.to_string();
        }

        let context: Vec<String> = prior_turns
            .iter()
            .map(|m| match m.role {
                Role::User => format!("{} {}", self.labels.user, m.content),
                Role::Assistant => format!("{} {}", self.labels.assistant, m.content),
            })
            .collect();

        debug!(prior_turns = prior_turns.len(), purpose = %purpose, "Enriching agent input");

        format!(
            "{header}\n{context}\n\n{current} {message}\n\n{instruction}",
            header = self.labels.header,
            context = context.join("\n"),
            current = self.labels.current,
            message = current_message,
            instruction = self.labels.instruction(purpose),
        )
    }
}

impl Default for ContextEnricher {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
