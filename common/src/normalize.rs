// Normalization of raw order submissions into canonical descriptors

use crate::errors::OrderError;
use crate::models::{
    EngageAction, OrderDescriptor, OrderKind, OwnerId, RelationshipAction, SearchStyle, Thresholds,
};
use lazy_static::lazy_static;
use regex::Regex;

/// Maximum number of accounts a single watch order may reference
pub const WATCH_LIST_MAX: usize = 4;

lazy_static! {
    // Twitter handle rules: word characters, 15 chars max
    static ref HANDLE_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{1,15}$").expect("valid regex");
    // Hash tags are a single slug, optionally prefixed with '#'
    static ref HASHTAG_RE: Regex = Regex::new(r"^#?[A-Za-z0-9_]{1,100}$").expect("valid regex");
}

/// Raw order submission, tagged with its order family
///
/// Field names follow the submission forms of the order wizard.
#[derive(Debug, Clone)]
pub enum OrderRequest {
    Relationship {
        operation: RelationshipAction,
        exclude: String,
    },
    Search {
        operation: EngageAction,
        search_by_hash_tag: String,
        search_style: SearchStyle,
        minimum_favorite: u32,
        minimum_retweet: u32,
    },
    WatchUsers {
        operation: EngageAction,
        twitter_user: String,
        minimum_favorite: u32,
        minimum_retweet: u32,
    },
}

/// Normalizer maps raw submissions into fully-populated descriptors
pub struct Normalizer;

impl Normalizer {
    /// Produce a canonical descriptor or fail with a validation error
    pub fn normalize(owner: OwnerId, request: OrderRequest) -> Result<OrderDescriptor, OrderError> {
        let kind = match request {
            OrderRequest::Relationship { operation, exclude } => OrderKind::Relationship {
                action: operation,
                exclude: exclude.trim().to_string(),
            },
            OrderRequest::Search {
                operation,
                search_by_hash_tag,
                search_style,
                minimum_favorite,
                minimum_retweet,
            } => {
                let hashtag = search_by_hash_tag.trim().to_string();
                if !HASHTAG_RE.is_match(&hashtag) {
                    return Err(OrderError::InvalidHashtag { value: hashtag });
                }
                OrderKind::Search {
                    action: operation,
                    hashtag,
                    style: search_style,
                    thresholds: Thresholds::from_raw(minimum_favorite, minimum_retweet),
                }
            }
            OrderRequest::WatchUsers {
                operation,
                twitter_user,
                minimum_favorite,
                minimum_retweet,
            } => OrderKind::Watch {
                action: operation,
                usernames: clean_watch_list(&twitter_user)?,
                thresholds: Thresholds::from_raw(minimum_favorite, minimum_retweet),
            },
        };

        Ok(OrderDescriptor::new(owner, kind))
    }
}

/// Split a comma separated username field into a validated watch list
///
/// Entries are trimmed and empty entries dropped. The list is capped at
/// `WATCH_LIST_MAX` entries and must not repeat a username.
fn clean_watch_list(raw: &str) -> Result<Vec<String>, OrderError> {
    let usernames: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();

    if usernames.len() > WATCH_LIST_MAX {
        return Err(OrderError::TooManyAccounts);
    }

    for (i, username) in usernames.iter().enumerate() {
        if usernames[..i].contains(username) {
            return Err(OrderError::DuplicateAccounts);
        }
        if !HANDLE_RE.is_match(username) {
            return Err(OrderError::InvalidUsername {
                value: username.clone(),
            });
        }
    }

    Ok(usernames)
}
