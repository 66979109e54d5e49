//! Error types for the Concierge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type; crate boundaries convert
//! between them with `#[from]`.

use thiserror::Error;

use crate::intent::Capability;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Persistence failures from the history store or the customer store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),
}

/// Both the history-aware and the history-free classification paths failed.
#[derive(Debug, Clone, Error)]
#[error("intent classification failed (with history: {primary}; without history: {fallback})")]
pub struct ClassificationError {
    pub primary: String,
    pub fallback: String,
}

/// A capability agent could not produce an answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("{capability} agent timed out after {secs}s")]
    Timeout { capability: Capability, secs: u64 },

    #[error("tool iteration limit reached ({0})")]
    IterationLimit(u32),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Whether the model can be told about this failure and try again.
    ///
    /// Bad arguments and unknown tool names are the model's own mistakes;
    /// execution failures (e.g. a duplicate email) end the agent run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ToolError::NotFound(_) | ToolError::InvalidArguments(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = AgentError::from(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_surfaces_reason_verbatim() {
        let err = AgentError::Tool(ToolError::ExecutionFailed {
            tool_name: "create_customer".into(),
            reason: "UNIQUE constraint failed: customers.email".into(),
        });
        assert!(err.to_string().contains("UNIQUE constraint failed: customers.email"));
    }

    #[test]
    fn classification_error_mentions_both_paths() {
        let err = ClassificationError {
            primary: "quota exceeded".into(),
            fallback: "timeout".into(),
        };
        let text = err.to_string();
        assert!(text.contains("quota exceeded"));
        assert!(text.contains("timeout"));
    }

    #[test]
    fn recoverable_tool_errors() {
        assert!(ToolError::InvalidArguments("missing email".into()).is_recoverable());
        assert!(ToolError::NotFound("delete_customer".into()).is_recoverable());
        assert!(!ToolError::ExecutionFailed {
            tool_name: "create_customer".into(),
            reason: "duplicate".into(),
        }
        .is_recoverable());
    }
}
