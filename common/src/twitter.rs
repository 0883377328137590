// Twitter account lookup collaborator

use crate::config::TwitterConfig;
use crate::errors::LookupError;
use crate::models::TwitterAccount;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::instrument;

/// Account existence check, authenticated as the submitting owner
///
/// Implementations must report timeouts and transport failures as errors;
/// a failed lookup is never treated as "account exists".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn lookup(&self, owner: &TwitterAccount, username: &str) -> Result<(), LookupError>;
}

/// Twitter API client for account lookups
pub struct TwitterClient {
    client: Client,
    base_url: String,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| LookupError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AccountLookup for TwitterClient {
    #[instrument(skip(self, owner), fields(owner_id = %owner.user_id))]
    async fn lookup(&self, owner: &TwitterAccount, username: &str) -> Result<(), LookupError> {
        let url = format!("{}/users/show.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("screen_name", username)])
            .bearer_auth(&owner.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(username = %username, error = %e, "Account lookup request failed");
                LookupError::Network(e.to_string())
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LookupError::NotFound {
                username: username.to_string(),
            }),
            status if status.is_success() => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(username = %username, %status, "Account lookup returned error status");
                Err(LookupError::Network(format!(
                    "Lookup failed with status {}: {}",
                    status, body
                )))
            }
        }
    }
}
