// Storage layer for schedule orders

use crate::errors::StorageError;
use crate::models::{Operation, OrderDescriptor, OrderParams, OwnerId};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

/// Persistence contract for schedule order descriptors
///
/// Implementations must provide a uniqueness backstop over
/// `(owner, operation, args, params)` for recurring descriptors so a
/// concurrent check-then-persist from the same owner cannot produce two
/// conflicting live orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Number of live recurring descriptors the owner has
    async fn count_recurring(&self, owner: OwnerId) -> Result<u64, StorageError>;

    /// All live recurring descriptors of the owner with the given operation
    async fn find_recurring(
        &self,
        owner: OwnerId,
        operation: Operation,
    ) -> Result<Vec<OrderDescriptor>, StorageError>;

    /// The owner's live recurring descriptor with an equal
    /// `(operation, args, params)` triple, if any
    async fn find_exact(
        &self,
        owner: OwnerId,
        operation: Operation,
        args: &[String],
        params: &OrderParams,
    ) -> Result<Option<OrderDescriptor>, StorageError>;

    /// Persist an accepted descriptor
    async fn persist(&self, descriptor: &OrderDescriptor) -> Result<(), StorageError>;

    /// Delete one of the owner's descriptors
    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<(), StorageError>;

    /// All descriptors of the owner, newest first
    async fn list(&self, owner: OwnerId) -> Result<Vec<OrderDescriptor>, StorageError>;
}
