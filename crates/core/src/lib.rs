//! # Concierge Core
//!
//! Domain types, traits, and error definitions for the Concierge intent router.
//! This crate has **zero framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the router is defined as a trait here: the history
//! store, the customer store, the text-generation provider, tools and the
//! capability agents. Implementations live in their respective crates, so the
//! orchestrator can be exercised with in-memory stores and scripted providers.

pub mod error;
pub mod message;
pub mod intent;
pub mod history;
pub mod customer;
pub mod provider;
pub mod tool;
pub mod agent;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, ClassificationError, ProviderError, StorageError, ToolError};
pub use message::{ConversationBuffer, Message, Role, SessionId};
pub use intent::{Capability, Intent, Locale};
pub use history::HistoryStore;
pub use customer::{Customer, CustomerStore, NewCustomer};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
pub use agent::CapabilityAgent;
