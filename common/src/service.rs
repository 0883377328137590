// Order submission service: normalize, check, validate, persist

use crate::config::OrdersConfig;
use crate::conflict::ConflictDetector;
use crate::errors::{OrderError, StorageError};
use crate::models::{OrderDescriptor, OrderKind, OwnerId, TwitterAccount};
use crate::normalize::{Normalizer, OrderRequest};
use crate::quota::QuotaGuard;
use crate::store::OrderStore;
use crate::telemetry;
use crate::twitter::AccountLookup;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// OrderService is the single entry point a UI layer talks to
///
/// Submission pipeline: normalize the raw fields, enforce the per-owner
/// quota, detect duplicates and overlaps, validate referenced accounts
/// (watch orders only), then persist. The first failing check wins; no
/// partial descriptor is ever persisted.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    lookup: Arc<dyn AccountLookup>,
    quota: QuotaGuard,
    detector: ConflictDetector,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        lookup: Arc<dyn AccountLookup>,
        config: &OrdersConfig,
    ) -> Self {
        Self {
            store,
            lookup,
            quota: QuotaGuard::new(config.max_recurring_per_owner),
            detector: ConflictDetector::new(),
        }
    }

    /// Submit a raw order for the owner, returning the accepted descriptor
    #[instrument(skip(self, owner, request), fields(owner_id = %owner.user_id))]
    pub async fn submit_order(
        &self,
        owner: &TwitterAccount,
        request: OrderRequest,
    ) -> Result<OrderDescriptor, OrderError> {
        match self.submit_inner(owner, request).await {
            Ok(descriptor) => {
                telemetry::record_order_submitted(&descriptor.operation().to_string());
                tracing::info!(
                    order_id = %descriptor.id,
                    label = %descriptor.label,
                    "Order accepted"
                );
                Ok(descriptor)
            }
            Err(err) => {
                telemetry::record_order_rejected(err.code());
                tracing::warn!(reason = err.code(), error = %err, "Order rejected");
                Err(err)
            }
        }
    }

    async fn submit_inner(
        &self,
        owner: &TwitterAccount,
        request: OrderRequest,
    ) -> Result<OrderDescriptor, OrderError> {
        let descriptor = Normalizer::normalize(owner.user_id, request)?;

        self.quota.check(self.store.as_ref(), descriptor.owner).await?;
        self.detector.check(self.store.as_ref(), &descriptor).await?;

        if let OrderKind::Watch { usernames, .. } = &descriptor.kind {
            self.validate_accounts(owner, usernames).await?;
        }

        self.store.persist(&descriptor).await?;
        Ok(descriptor)
    }

    /// Confirm every watched account exists before accepting the order
    ///
    /// Partial success is not allowed; the first failed lookup rejects the
    /// whole submission.
    async fn validate_accounts(
        &self,
        owner: &TwitterAccount,
        usernames: &[String],
    ) -> Result<(), OrderError> {
        for username in usernames {
            let started = Instant::now();
            let result = self.lookup.lookup(owner, username).await;
            telemetry::record_lookup_duration(started.elapsed().as_secs_f64());

            if let Err(err) = result {
                tracing::warn!(username = %username, error = %err, "Account validation failed");
                return Err(OrderError::UnknownAccount {
                    username: username.clone(),
                });
            }
        }
        Ok(())
    }

    /// Delete one of the owner's orders
    #[instrument(skip(self))]
    pub async fn delete_order(&self, owner: OwnerId, id: Uuid) -> Result<(), StorageError> {
        self.store.delete(owner, id).await
    }

    /// All of the owner's orders, newest first
    #[instrument(skip(self))]
    pub async fn list_orders(&self, owner: OwnerId) -> Result<Vec<OrderDescriptor>, StorageError> {
        self.store.list(owner).await
    }
}
