//! Create customer tool: the only action available to the create agent.

use async_trait::async_trait;
use concierge_core::customer::{CustomerStore, NewCustomer};
use concierge_core::error::{StorageError, ToolError};
use concierge_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::info;

pub struct CreateCustomerTool {
    store: Arc<dyn CustomerStore>,
}

impl CreateCustomerTool {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }
}

fn required_str<'a>(arguments: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

#[async_trait]
impl Tool for CreateCustomerTool {
    fn name(&self) -> &str {
        "create_customer"
    }

    fn description(&self) -> &str {
        "Create a customer in the database. Requires both the customer's name and email. \
         Only call this once you have both values."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Customer's full name"
                },
                "email": {
                    "type": "string",
                    "description": "Customer's email address"
                }
            },
            "required": ["name", "email"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let name = required_str(&arguments, "name")?;
        let email = required_str(&arguments, "email")?;

        if !email.contains('@') {
            return Err(ToolError::InvalidArguments(format!(
                "'{email}' is not a valid email address"
            )));
        }

        let customer = self
            .store
            .create(NewCustomer {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().to_string(),
                reason: match e {
                    StorageError::Constraint(reason) => reason,
                    other => other.to_string(),
                },
            })?;

        info!(id = customer.id, "create_customer succeeded");
        Ok(ToolResult {
            success: true,
            output: format!("✅ Cliente creado: {} ({})", customer.name, customer.email),
        })
    }
}
