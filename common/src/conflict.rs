// Duplicate and overlap detection against an owner's live orders

use crate::errors::OrderError;
use crate::models::{OrderDescriptor, OrderKind};
use crate::store::OrderStore;
use tracing::instrument;

/// ConflictDetector decides whether a candidate descriptor collides with
/// one of the owner's existing live descriptors
///
/// Only recurring descriptors participate; one-shot orders are never
/// considered on either side.
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, store, candidate), fields(owner_id = %candidate.owner, operation = %candidate.operation()))]
    pub async fn check(
        &self,
        store: &dyn OrderStore,
        candidate: &OrderDescriptor,
    ) -> Result<(), OrderError> {
        if !candidate.recurring {
            return Ok(());
        }

        let operation = candidate.operation();

        // A watched account may not be split across two orders with the same
        // operation, even when thresholds differ. Checked before the exact
        // match so the warning can name the offending account.
        if let OrderKind::Watch { usernames, .. } = &candidate.kind {
            let existing = store.find_recurring(candidate.owner, operation).await?;
            for username in usernames {
                if existing.iter().any(|order| order.watches(username)) {
                    tracing::debug!(username = %username, "Watched account already in use");
                    return Err(OrderError::AccountOverlap {
                        username: username.clone(),
                    });
                }
            }
        }

        if let Some(existing) = store
            .find_exact(
                candidate.owner,
                operation,
                &candidate.args(),
                &candidate.params(),
            )
            .await?
        {
            tracing::debug!(label = %existing.label, "Exact duplicate found");
            return Err(OrderError::DuplicateOrder {
                label: existing.label,
            });
        }

        Ok(())
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        EngageAction, OrderKind, OwnerId, RelationshipAction, SearchStyle, Thresholds,
    };
    use crate::store::MemoryOrderStore;
    use uuid::Uuid;

    fn owner() -> OwnerId {
        OwnerId(Uuid::new_v4())
    }

    fn watch(owner: OwnerId, usernames: &[&str], fav: u32) -> OrderDescriptor {
        OrderDescriptor::new(
            owner,
            OrderKind::Watch {
                action: EngageAction::Favorite,
                usernames: usernames.iter().map(|u| u.to_string()).collect(),
                thresholds: Thresholds::from_raw(fav, 0),
            },
        )
    }

    #[tokio::test]
    async fn test_exact_duplicate_names_existing_label() {
        let store = MemoryOrderStore::new();
        let detector = ConflictDetector::new();
        let owner = owner();

        let first = OrderDescriptor::new(
            owner,
            OrderKind::Relationship {
                action: RelationshipAction::Follow,
                exclude: String::new(),
            },
        );
        store.persist(&first).await.unwrap();

        let second = OrderDescriptor::new(
            owner,
            OrderKind::Relationship {
                action: RelationshipAction::Follow,
                exclude: String::new(),
            },
        );
        let err = detector.check(&store, &second).await.unwrap_err();
        match err {
            OrderError::DuplicateOrder { label } => {
                assert_eq!(label, "follow back: runs hourly");
            }
            other => panic!("Expected duplicate order, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watch_overlap_beats_exact_match() {
        let store = MemoryOrderStore::new();
        let detector = ConflictDetector::new();
        let owner = owner();

        store.persist(&watch(owner, &["alice", "bob"], 0)).await.unwrap();

        // Different thresholds, shared account: still rejected, and the
        // error names the account rather than the whole order
        let candidate = watch(owner, &["bob", "carol"], 7);
        let err = detector.check(&store, &candidate).await.unwrap_err();
        match err {
            OrderError::AccountOverlap { username } => assert_eq!(username, "bob"),
            other => panic!("Expected account overlap, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watch_overlap_ignores_other_operations() {
        let store = MemoryOrderStore::new();
        let detector = ConflictDetector::new();
        let owner = owner();

        store.persist(&watch(owner, &["alice"], 0)).await.unwrap();

        // Same account under retweet_watch: different operation, no overlap
        let candidate = OrderDescriptor::new(
            owner,
            OrderKind::Watch {
                action: EngageAction::Retweet,
                usernames: vec!["alice".to_string()],
                thresholds: Thresholds::default(),
            },
        );
        assert!(detector.check(&store, &candidate).await.is_ok());
    }

    #[tokio::test]
    async fn test_search_orders_with_different_hashtags_pass() {
        let store = MemoryOrderStore::new();
        let detector = ConflictDetector::new();
        let owner = owner();

        let first = OrderDescriptor::new(
            owner,
            OrderKind::Search {
                action: EngageAction::Retweet,
                hashtag: "#rust".to_string(),
                style: SearchStyle::DailySearch,
                thresholds: Thresholds::default(),
            },
        );
        store.persist(&first).await.unwrap();

        let second = OrderDescriptor::new(
            owner,
            OrderKind::Search {
                action: EngageAction::Retweet,
                hashtag: "#tokio".to_string(),
                style: SearchStyle::DailySearch,
                thresholds: Thresholds::default(),
            },
        );
        assert!(detector.check(&store, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_detection_scoped_to_owner() {
        let store = MemoryOrderStore::new();
        let detector = ConflictDetector::new();

        store
            .persist(&watch(owner(), &["alice"], 0))
            .await
            .unwrap();

        let candidate = watch(owner(), &["alice"], 0);
        assert!(detector.check(&store, &candidate).await.is_ok());
    }
}
