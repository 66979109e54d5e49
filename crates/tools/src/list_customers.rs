//! List customers tool: used by the query agent.
//!
//! Takes an optional `filter` that is matched case-insensitively against
//! name and email, so follow-ups like "only the ones at example.com" can be
//! answered without a second tool.

use async_trait::async_trait;
use concierge_core::customer::CustomerStore;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolResult};
use std::sync::Arc;

pub struct ListCustomersTool {
    store: Arc<dyn CustomerStore>,
}

impl ListCustomersTool {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListCustomersTool {
    fn name(&self) -> &str {
        "list_customers"
    }

    fn description(&self) -> &str {
        "Return the customers registered in the database, one per line as '- name | email'. \
         Optionally pass a filter to keep only customers whose name or email contains it."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "string",
                    "description": "Optional text to match against name or email"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let filter = arguments
            .get("filter")
            .and_then(|f| f.as_str())
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        let customers = self
            .store
            .list()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let lines: Vec<String> = customers
            .iter()
            .filter(|c| match &filter {
                Some(f) => c.name.to_lowercase().contains(f) || c.email.to_lowercase().contains(f),
                None => true,
            })
            .map(|c| format!("- {} | {}", c.name, c.email))
            .collect();

        let output = if lines.is_empty() {
            "📭 No hay clientes registrados".to_string()
        } else {
            lines.join("\n")
        };

        Ok(ToolResult {
            success: true,
            output,
        })
    }
}
