//! In-memory backends: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use concierge_core::customer::{Customer, CustomerStore, NewCustomer};
use concierge_core::error::StorageError;
use concierge_core::history::HistoryStore;
use concierge_core::message::{Message, Role, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::next_timestamp;

/// Session histories kept in a map of vectors.
/// Nothing survives a restart.
pub struct InMemoryHistory {
    sessions: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, session_id: &str, role: Role, content: &str) -> Result<Message, StorageError> {
        let mut sessions = self.sessions.write().await;
        let log = sessions.entry(session_id.to_string()).or_default();
        let message = Message {
            session_id: SessionId::from(session_id),
            role,
            content: content.to_string(),
            timestamp: next_timestamp(log.last().map(|m| m.timestamp)),
        };
        log.push(message.clone());
        Ok(message)
    }

    async fn list(&self, session_id: &str) -> Result<Vec<Message>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<usize, StorageError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(session_id).map(|log| log.len()).unwrap_or(0))
    }
}

/// Customers in a vector, with the same unique-email rule as the SQLite table.
pub struct InMemoryCustomers {
    customers: Arc<RwLock<Vec<Customer>>>,
}

impl InMemoryCustomers {
    pub fn new() -> Self {
        Self {
            customers: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryCustomers {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomers {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer, StorageError> {
        let mut customers = self.customers.write().await;
        if customers.iter().any(|c| c.email == customer.email) {
            return Err(StorageError::Constraint(format!(
                "a customer with email '{}' already exists",
                customer.email
            )));
        }
        let stored = Customer {
            id: customers.len() as i64 + 1,
            name: customer.name,
            email: customer.email,
        };
        customers.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Customer>, StorageError> {
        Ok(self.customers.read().await.clone())
    }
}
