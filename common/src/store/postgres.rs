// PostgreSQL order store implementation

use crate::config::DatabaseConfig;
use crate::errors::{DatabaseError, StorageError};
use crate::models::{
    EngageAction, Operation, OrderDescriptor, OrderKind, OrderParams, OwnerId, RelationshipAction,
    SearchStyle, Thresholds,
};
use crate::store::OrderStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Order store backed by PostgreSQL
///
/// The schedule_orders table carries a partial unique index over
/// `(owner_id, operation, args, params)` for recurring rows; together with
/// the per-owner advisory lock taken in [`persist`](OrderStore::persist)
/// this closes the check-then-persist race between concurrent submissions.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Connect a new store using the configured pool settings
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create database pool");
                DatabaseError::ConnectionFailed(e.to_string())
            })?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connection pool initialized"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests and tooling)
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Verify the database connection is healthy
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                DatabaseError::HealthCheckFailed(e.to_string())
            })?;
        Ok(())
    }
}

/// Advisory lock key derived from the owner id; serializes one owner's
/// check-then-persist sequences without blocking other owners
fn owner_lock_key(owner: OwnerId) -> i64 {
    let b = owner.0.as_bytes();
    i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

fn db_err(err: sqlx::Error) -> StorageError {
    StorageError::from(DatabaseError::from(err))
}

/// Rebuild the typed order kind from its persisted triple
fn kind_from_parts(
    operation: Operation,
    args: Vec<String>,
    params: OrderParams,
) -> Result<OrderKind, DatabaseError> {
    let thresholds = Thresholds {
        minimum_favorite: params.minimum_favorite,
        minimum_retweet: params.minimum_retweet,
    };
    let kind = match operation {
        Operation::Follow | Operation::Unfollow => OrderKind::Relationship {
            action: if operation == Operation::Follow {
                RelationshipAction::Follow
            } else {
                RelationshipAction::Unfollow
            },
            exclude: params.exclude.unwrap_or_default(),
        },
        Operation::FavoriteSearch | Operation::RetweetSearch => {
            let hashtag = args.into_iter().next().ok_or_else(|| {
                DatabaseError::QueryFailed("Search order row missing hashtag arg".to_string())
            })?;
            OrderKind::Search {
                action: if operation == Operation::FavoriteSearch {
                    EngageAction::Favorite
                } else {
                    EngageAction::Retweet
                },
                hashtag,
                style: SearchStyle::from_i32(params.search_style.unwrap_or(0))
                    .map_err(DatabaseError::QueryFailed)?,
                thresholds,
            }
        }
        Operation::FavoriteWatch | Operation::RetweetWatch => OrderKind::Watch {
            action: if operation == Operation::FavoriteWatch {
                EngageAction::Favorite
            } else {
                EngageAction::Retweet
            },
            usernames: args,
            thresholds,
        },
    };
    Ok(kind)
}

fn row_to_descriptor(row: &PgRow) -> Result<OrderDescriptor, DatabaseError> {
    let operation_str: String = row.try_get("operation")?;
    let operation = Operation::from_str(&operation_str).map_err(DatabaseError::QueryFailed)?;

    let args_json: serde_json::Value = row.try_get("args")?;
    let args: Vec<String> = serde_json::from_value(args_json)
        .map_err(|e| DatabaseError::QueryFailed(format!("Failed to parse args: {}", e)))?;

    let params_json: serde_json::Value = row.try_get("params")?;
    let params: OrderParams = serde_json::from_value(params_json)
        .map_err(|e| DatabaseError::QueryFailed(format!("Failed to parse params: {}", e)))?;

    Ok(OrderDescriptor {
        id: row.try_get("id")?,
        owner: OwnerId(row.try_get("owner_id")?),
        kind: kind_from_parts(operation, args, params)?,
        label: row.try_get("label")?,
        recurring: row.try_get("recurring")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self))]
    async fn count_recurring(&self, owner: OwnerId) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM schedule_orders WHERE owner_id = $1 AND recurring = true",
        )
        .bind(owner.0)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(count as u64)
    }

    #[instrument(skip(self))]
    async fn find_recurring(
        &self,
        owner: OwnerId,
        operation: Operation,
    ) -> Result<Vec<OrderDescriptor>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, operation, args, params, label, recurring, created_at
            FROM schedule_orders
            WHERE owner_id = $1 AND operation = $2 AND recurring = true
            "#,
        )
        .bind(owner.0)
        .bind(operation.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut descriptors = Vec::with_capacity(rows.len());
        for row in &rows {
            descriptors.push(row_to_descriptor(row)?);
        }

        tracing::debug!(count = descriptors.len(), "Found recurring orders");
        Ok(descriptors)
    }

    #[instrument(skip(self, args, params))]
    async fn find_exact(
        &self,
        owner: OwnerId,
        operation: Operation,
        args: &[String],
        params: &OrderParams,
    ) -> Result<Option<OrderDescriptor>, StorageError> {
        let args_json = serde_json::to_value(args)?;
        let params_json = serde_json::to_value(params)?;

        let row = sqlx::query(
            r#"
            SELECT id, owner_id, operation, args, params, label, recurring, created_at
            FROM schedule_orders
            WHERE owner_id = $1 AND operation = $2
              AND args = $3 AND params = $4 AND recurring = true
            "#,
        )
        .bind(owner.0)
        .bind(operation.to_string())
        .bind(args_json)
        .bind(params_json)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref()
            .map(row_to_descriptor)
            .transpose()
            .map_err(StorageError::from)
    }

    #[instrument(skip(self, descriptor), fields(owner_id = %descriptor.owner, operation = %descriptor.operation()))]
    async fn persist(&self, descriptor: &OrderDescriptor) -> Result<(), StorageError> {
        let args_json = serde_json::to_value(descriptor.args())?;
        let params_json = serde_json::to_value(descriptor.params())?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Serialize writes per owner; the unique index remains the backstop
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_lock_key(descriptor.owner))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO schedule_orders (
                id, owner_id, operation, args, params, label, recurring, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(descriptor.id)
        .bind(descriptor.owner.0)
        .bind(descriptor.operation().to_string())
        .bind(args_json)
        .bind(params_json)
        .bind(&descriptor.label)
        .bind(descriptor.recurring)
        .bind(descriptor.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        tracing::info!(order_id = %descriptor.id, label = %descriptor.label, "Order persisted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, owner: OwnerId, id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM schedule_orders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.0)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Order not found: {}", id)));
        }

        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, owner: OwnerId) -> Result<Vec<OrderDescriptor>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, operation, args, params, label, recurring, created_at
            FROM schedule_orders
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut descriptors = Vec::with_capacity(rows.len());
        for row in &rows {
            descriptors.push(row_to_descriptor(row)?);
        }
        Ok(descriptors)
    }
}
