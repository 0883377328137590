// In-memory order store for tests and local development

use crate::errors::StorageError;
use crate::models::{Operation, OrderDescriptor, OrderParams, OwnerId};
use crate::store::OrderStore;
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

/// Mutex-guarded in-process order store
///
/// Enforces the same `(owner, operation, args, params)` uniqueness backstop
/// as the Postgres backend, so race-condition behavior matches production.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<OrderDescriptor>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn count_recurring(&self, owner: OwnerId) -> Result<u64, StorageError> {
        let orders = self.orders.lock().expect("order store lock poisoned");
        Ok(orders
            .iter()
            .filter(|o| o.owner == owner && o.recurring)
            .count() as u64)
    }

    async fn find_recurring(
        &self,
        owner: OwnerId,
        operation: Operation,
    ) -> Result<Vec<OrderDescriptor>, StorageError> {
        let orders = self.orders.lock().expect("order store lock poisoned");
        Ok(orders
            .iter()
            .filter(|o| o.owner == owner && o.recurring && o.operation() == operation)
            .cloned()
            .collect())
    }

    async fn find_exact(
        &self,
        owner: OwnerId,
        operation: Operation,
        args: &[String],
        params: &OrderParams,
    ) -> Result<Option<OrderDescriptor>, StorageError> {
        let orders = self.orders.lock().expect("order store lock poisoned");
        Ok(orders
            .iter()
            .find(|o| {
                o.owner == owner
                    && o.recurring
                    && o.operation() == operation
                    && o.args() == args
                    && &o.params() == params
            })
            .cloned())
    }

    async fn persist(&self, descriptor: &OrderDescriptor) -> Result<(), StorageError> {
        let mut orders = self.orders.lock().expect("order store lock poisoned");
        let duplicate = descriptor.recurring
            && orders.iter().any(|o| {
                o.owner == descriptor.owner
                    && o.recurring
                    && o.operation() == descriptor.operation()
                    && o.args() == descriptor.args()
                    && o.params() == descriptor.params()
            });
        if duplicate {
            return Err(StorageError::DuplicateKey(descriptor.label.clone()));
        }
        orders.push(descriptor.clone());
        Ok(())
    }

    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<(), StorageError> {
        let mut orders = self.orders.lock().expect("order store lock poisoned");
        let before = orders.len();
        orders.retain(|o| !(o.owner == owner && o.id == id));
        if orders.len() == before {
            return Err(StorageError::NotFound(format!("Order not found: {}", id)));
        }
        Ok(())
    }

    async fn list(&self, owner: OwnerId) -> Result<Vec<OrderDescriptor>, StorageError> {
        let orders = self.orders.lock().expect("order store lock poisoned");
        let mut result: Vec<OrderDescriptor> = orders
            .iter()
            .filter(|o| o.owner == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
