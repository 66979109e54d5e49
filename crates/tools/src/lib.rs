//! Customer tools for Concierge.
//!
//! Each capability agent gets its own registry so the create agent cannot
//! list and the query agent cannot write.

pub mod create_customer;
pub mod list_customers;

pub use create_customer::CreateCustomerTool;
pub use list_customers::ListCustomersTool;

use concierge_core::customer::CustomerStore;
use concierge_core::intent::Capability;
use concierge_core::tool::ToolRegistry;
use std::sync::Arc;

/// Registry for the create agent: `create_customer` only.
pub fn create_registry(store: Arc<dyn CustomerStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CreateCustomerTool::new(store)));
    registry
}

/// Registry for the query agent: `list_customers` only.
pub fn query_registry(store: Arc<dyn CustomerStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ListCustomersTool::new(store)));
    registry
}

/// Registry for a capability.
pub fn registry_for(capability: Capability, store: Arc<dyn CustomerStore>) -> ToolRegistry {
    match capability {
        Capability::Create => create_registry(store),
        Capability::Query => query_registry(store),
    }
}
