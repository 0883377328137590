// Property-based tests for order normalization

use common::errors::OrderError;
use common::models::{EngageAction, OwnerId, RelationshipAction, SearchStyle, Thresholds};
use common::normalize::{Normalizer, OrderRequest};
use proptest::prelude::*;
use std::collections::HashSet;
use uuid::Uuid;

fn owner() -> OwnerId {
    OwnerId(Uuid::new_v4())
}

/// *For any* relationship submission, the derived label names the verb and
/// the stored function parameter equals the verb.
#[test]
fn property_relationship_label_and_func_follow_the_verb() {
    proptest!(|(
        follow in any::<bool>(),
        exclude in "[ a-zA-Z0-9_,]{0,40}"
    )| {
        let action = if follow {
            RelationshipAction::Follow
        } else {
            RelationshipAction::Unfollow
        };
        let descriptor = Normalizer::normalize(
            owner(),
            OrderRequest::Relationship { operation: action, exclude },
        )
        .unwrap();

        prop_assert_eq!(descriptor.label.clone(), format!("{} back: runs hourly", action));
        prop_assert_eq!(descriptor.params().func, action.to_string());
        prop_assert!(descriptor.args().is_empty());
        prop_assert!(descriptor.recurring);
    });
}

/// *For any* search submission, the operation identifier carries the
/// `_search` suffix and the function parameter is the suffix-stripped verb.
#[test]
fn property_search_operation_suffix_and_func() {
    proptest!(|(
        retweet in any::<bool>(),
        hashtag in "#?[A-Za-z0-9_]{1,40}",
        hourly in any::<bool>(),
        minimum_favorite in 0u32..100,
        minimum_retweet in 0u32..100
    )| {
        let action = if retweet { EngageAction::Retweet } else { EngageAction::Favorite };
        let descriptor = Normalizer::normalize(
            owner(),
            OrderRequest::Search {
                operation: action,
                search_by_hash_tag: hashtag.clone(),
                search_style: if hourly { SearchStyle::HourlySearch } else { SearchStyle::DailySearch },
                minimum_favorite,
                minimum_retweet,
            },
        )
        .unwrap();

        let operation = descriptor.operation().to_string();
        prop_assert!(operation.ends_with("_search"));
        prop_assert_eq!(
            descriptor.params().func,
            operation.trim_end_matches("_search").to_string()
        );
        prop_assert_eq!(descriptor.args(), vec![hashtag.clone()]);
        prop_assert_eq!(
            descriptor.label.clone(),
            format!("search for {} and {} - hourly", hashtag, action)
        );
    });
}

/// *For any* watch submission of up to four unique handles, the cleaned
/// list survives unchanged and each handle appears `@`-prefixed in the label.
#[test]
fn property_watch_list_roundtrip_and_label() {
    proptest!(|(
        handles in prop::collection::hash_set("[A-Za-z0-9_]{1,15}", 1..=4),
        retweet in any::<bool>()
    )| {
        let handles: Vec<String> = handles.into_iter().collect();
        let action = if retweet { EngageAction::Retweet } else { EngageAction::Favorite };
        let descriptor = Normalizer::normalize(
            owner(),
            OrderRequest::WatchUsers {
                operation: action,
                twitter_user: handles.join(" , "),
                minimum_favorite: 0,
                minimum_retweet: 0,
            },
        )
        .unwrap();

        prop_assert_eq!(descriptor.args(), handles.clone());
        let watched = handles
            .iter()
            .map(|u| format!("@{}", u))
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(
            descriptor.label.clone(),
            format!("watch {} and {} - hourly", watched, action)
        );
        prop_assert!(descriptor.operation().to_string().ends_with("_watch"));
    });
}

/// *For any* watch submission repeating a handle, normalization fails with
/// the duplicate-accounts error.
#[test]
fn property_watch_list_rejects_repeated_handles() {
    proptest!(|(
        handles in prop::collection::hash_set("[A-Za-z0-9_]{1,15}", 1..=3)
    )| {
        let mut handles: Vec<String> = handles.into_iter().collect();
        handles.push(handles[0].clone());

        let result = Normalizer::normalize(
            owner(),
            OrderRequest::WatchUsers {
                operation: EngageAction::Favorite,
                twitter_user: handles.join(","),
                minimum_favorite: 0,
                minimum_retweet: 0,
            },
        );
        prop_assert!(matches!(result, Err(OrderError::DuplicateAccounts)));
    });
}

/// *For any* watch submission of more than four unique handles,
/// normalization fails with the too-many-accounts error.
#[test]
fn property_watch_list_rejects_more_than_four_handles() {
    proptest!(|(
        handles in prop::collection::hash_set("[A-Za-z0-9_]{1,15}", 5..=8)
    )| {
        let handles: Vec<String> = handles.into_iter().collect();
        let result = Normalizer::normalize(
            owner(),
            OrderRequest::WatchUsers {
                operation: EngageAction::Retweet,
                twitter_user: handles.join(","),
                minimum_favorite: 0,
                minimum_retweet: 0,
            },
        );
        prop_assert!(matches!(result, Err(OrderError::TooManyAccounts)));
    });
}

/// *For any* raw threshold pair, zero maps to the absent sentinel and
/// positive values survive unchanged.
#[test]
fn property_zero_thresholds_normalize_to_absent() {
    proptest!(|(minimum_favorite in 0u32..100, minimum_retweet in 0u32..100)| {
        let thresholds = Thresholds::from_raw(minimum_favorite, minimum_retweet);
        if minimum_favorite == 0 {
            prop_assert_eq!(thresholds.minimum_favorite, None);
        } else {
            prop_assert_eq!(thresholds.minimum_favorite, Some(minimum_favorite));
        }
        if minimum_retweet == 0 {
            prop_assert_eq!(thresholds.minimum_retweet, None);
        } else {
            prop_assert_eq!(thresholds.minimum_retweet, Some(minimum_retweet));
        }
    });
}

/// Handles differing only in case are distinct entries for list cleaning;
/// the cleaner does not fold case.
#[test]
fn property_watch_list_preserves_case() {
    proptest!(|(handle in "[a-z0-9_]{1,10}")| {
        let upper = handle.to_uppercase();
        prop_assume!(upper != handle);

        let mut set = HashSet::new();
        set.insert(handle.clone());
        set.insert(upper.clone());
        prop_assume!(set.len() == 2);

        let descriptor = Normalizer::normalize(
            owner(),
            OrderRequest::WatchUsers {
                operation: EngageAction::Favorite,
                twitter_user: format!("{},{}", handle, upper),
                minimum_favorite: 0,
                minimum_retweet: 0,
            },
        )
        .unwrap();
        prop_assert_eq!(descriptor.args(), vec![handle, upper]);
    });
}
