// Error handling framework

use thiserror::Error;

/// Order submission errors
///
/// Every check in the submission pipeline returns the first failure it
/// encounters and stops; failures are never batched into a combined report.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("No more than \"{limit}\" orders per user")]
    QuotaExceeded { limit: u32 },

    #[error("This is a duplicate setup, you already have \"{label}\"")]
    DuplicateOrder { label: String },

    #[error("The user {username} already used in similar operation")]
    AccountOverlap { username: String },

    #[error("Only 4 users maximum")]
    TooManyAccounts,

    #[error("You must provide unique users")]
    DuplicateAccounts,

    #[error("\"{value}\" is not a valid hash tag")]
    InvalidHashtag { value: String },

    #[error("\"{value}\" is not a valid twitter username")]
    InvalidUsername { value: String },

    #[error("User {username} does not exist on twitter")]
    UnknownAccount { username: String },

    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),
}

impl OrderError {
    /// Stable machine-readable code for metrics labels and API responses
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            OrderError::DuplicateOrder { .. } => "DUPLICATE_ORDER",
            OrderError::AccountOverlap { .. } => "ACCOUNT_OVERLAP",
            OrderError::TooManyAccounts => "TOO_MANY_ACCOUNTS",
            OrderError::DuplicateAccounts => "DUPLICATE_ACCOUNTS",
            OrderError::InvalidHashtag { .. } => "INVALID_HASHTAG",
            OrderError::InvalidUsername { .. } => "INVALID_USERNAME",
            OrderError::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            OrderError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Twitter account lookup errors
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Account not found: {username}")]
    NotFound { username: String },

    #[error("Twitter request failed: {0}")]
    Network(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::new(err.code(), err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::new("STORAGE_ERROR", err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        let code = match err {
            LookupError::NotFound { .. } => "ACCOUNT_NOT_FOUND",
            LookupError::Network(_) => "TWITTER_UNAVAILABLE",
        };
        ApiError::new(code, err.to_string())
    }
}

// Implement From for common external errors
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for specific database error codes
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateKey(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<DatabaseError> for StorageError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateKey(msg) => StorageError::DuplicateKey(msg),
            DatabaseError::NotFound(msg) => StorageError::NotFound(msg),
            DatabaseError::ConnectionFailed(msg) => StorageError::ConnectionFailed(msg),
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::InvalidJson(err.to_string())
    }
}
