//! Customer records: the entity the capability tools create and list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::StorageError;

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

/// Persistent customer storage. Emails are unique; inserting a duplicate
/// fails with `StorageError::Constraint`.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    fn name(&self) -> &str;

    /// Insert a customer and return the stored record.
    async fn create(&self, customer: NewCustomer) -> std::result::Result<Customer, StorageError>;

    /// All customers in insertion order.
    async fn list(&self) -> std::result::Result<Vec<Customer>, StorageError>;
}
