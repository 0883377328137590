// Per-owner ceiling on live recurring orders

use crate::errors::OrderError;
use crate::models::OwnerId;
use crate::store::OrderStore;
use tracing::instrument;

/// QuotaGuard rejects new recurring orders once an owner reaches the
/// configured ceiling
///
/// The check is independent of order family; ordering relative to the
/// conflict check is not significant since both must pass.
pub struct QuotaGuard {
    limit: u32,
}

impl QuotaGuard {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[instrument(skip(self, store))]
    pub async fn check(&self, store: &dyn OrderStore, owner: OwnerId) -> Result<(), OrderError> {
        let count = store.count_recurring(owner).await?;
        tracing::debug!(count, limit = self.limit, "Checked recurring order count");

        if count >= u64::from(self.limit) {
            return Err(OrderError::QuotaExceeded { limit: self.limit });
        }
        Ok(())
    }
}
