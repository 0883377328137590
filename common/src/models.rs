use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Owner Models
// ============================================================================

/// Identifier of the Twitter account an order belongs to
///
/// All quota and duplicate detection is scoped to a single owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// TwitterAccount carries the owner identity and the credential the
/// account lookup collaborator authenticates with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterAccount {
    pub user_id: OwnerId,
    pub screen_name: String,
    #[serde(skip_serializing)]
    pub access_token: String,
}

// ============================================================================
// Order Models
// ============================================================================

/// RelationshipAction is the verb of a follow-back style order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipAction {
    Follow,
    Unfollow,
}

impl RelationshipAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipAction::Follow => "follow",
            RelationshipAction::Unfollow => "unfollow",
        }
    }
}

impl fmt::Display for RelationshipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(RelationshipAction::Follow),
            "unfollow" => Ok(RelationshipAction::Unfollow),
            _ => Err(format!("Invalid relationship action: {}", s)),
        }
    }
}

/// EngageAction is the base verb shared by the search and watch families
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngageAction {
    Favorite,
    Retweet,
}

impl EngageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngageAction::Favorite => "favorite",
            EngageAction::Retweet => "retweet",
        }
    }
}

impl fmt::Display for EngageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorite" => Ok(EngageAction::Favorite),
            "retweet" => Ok(EngageAction::Retweet),
            _ => Err(format!("Invalid engage action: {}", s)),
        }
    }
}

/// SearchStyle controls how often the hashtag search itself runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStyle {
    /// Search once a day, engage the results every hour
    DailySearch,
    /// Search every hour, engage the results
    HourlySearch,
}

impl SearchStyle {
    pub fn as_i32(&self) -> i32 {
        match self {
            SearchStyle::DailySearch => 0,
            SearchStyle::HourlySearch => 1,
        }
    }

    pub fn from_i32(value: i32) -> Result<Self, String> {
        match value {
            0 => Ok(SearchStyle::DailySearch),
            1 => Ok(SearchStyle::HourlySearch),
            _ => Err(format!("Invalid search style: {}", value)),
        }
    }
}

/// Engagement thresholds for search and watch orders
///
/// A zero threshold submitted by the caller is stored as `None` so that
/// "no threshold specified" compares uniformly during duplicate detection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thresholds {
    pub minimum_favorite: Option<u32>,
    pub minimum_retweet: Option<u32>,
}

impl Thresholds {
    pub fn from_raw(minimum_favorite: u32, minimum_retweet: u32) -> Self {
        Self {
            minimum_favorite: (minimum_favorite > 0).then_some(minimum_favorite),
            minimum_retweet: (minimum_retweet > 0).then_some(minimum_retweet),
        }
    }
}

/// Operation identifies the automation function a descriptor schedules
///
/// The `_search`/`_watch` suffixes survive only in the persisted and
/// displayed identifier; dispatch goes through `OrderKind` variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Follow,
    Unfollow,
    FavoriteSearch,
    RetweetSearch,
    FavoriteWatch,
    RetweetWatch,
}

impl Operation {
    /// The base function name, with any family suffix stripped
    pub fn base_func(&self) -> &'static str {
        match self {
            Operation::Follow => "follow",
            Operation::Unfollow => "unfollow",
            Operation::FavoriteSearch | Operation::FavoriteWatch => "favorite",
            Operation::RetweetSearch | Operation::RetweetWatch => "retweet",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Follow => write!(f, "follow"),
            Operation::Unfollow => write!(f, "unfollow"),
            Operation::FavoriteSearch => write!(f, "favorite_search"),
            Operation::RetweetSearch => write!(f, "retweet_search"),
            Operation::FavoriteWatch => write!(f, "favorite_watch"),
            Operation::RetweetWatch => write!(f, "retweet_watch"),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(Operation::Follow),
            "unfollow" => Ok(Operation::Unfollow),
            "favorite_search" => Ok(Operation::FavoriteSearch),
            "retweet_search" => Ok(Operation::RetweetSearch),
            "favorite_watch" => Ok(Operation::FavoriteWatch),
            "retweet_watch" => Ok(Operation::RetweetWatch),
            _ => Err(format!("Invalid operation: {}", s)),
        }
    }
}

impl TryFrom<String> for Operation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

/// OrderKind is the family-tagged payload of a descriptor
///
/// One variant per order family, each with its own typed field set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum OrderKind {
    /// Follow or unfollow back everyone who follows/unfollows the owner
    Relationship {
        action: RelationshipAction,
        /// Comma separated usernames the job must leave alone; free text
        exclude: String,
    },
    /// Engage tweets found by a hashtag search
    Search {
        action: EngageAction,
        hashtag: String,
        style: SearchStyle,
        thresholds: Thresholds,
    },
    /// Engage new tweets from a fixed list of watched accounts
    Watch {
        action: EngageAction,
        usernames: Vec<String>,
        thresholds: Thresholds,
    },
}

impl OrderKind {
    pub fn operation(&self) -> Operation {
        match self {
            OrderKind::Relationship {
                action: RelationshipAction::Follow,
                ..
            } => Operation::Follow,
            OrderKind::Relationship {
                action: RelationshipAction::Unfollow,
                ..
            } => Operation::Unfollow,
            OrderKind::Search {
                action: EngageAction::Favorite,
                ..
            } => Operation::FavoriteSearch,
            OrderKind::Search {
                action: EngageAction::Retweet,
                ..
            } => Operation::RetweetSearch,
            OrderKind::Watch {
                action: EngageAction::Favorite,
                ..
            } => Operation::FavoriteWatch,
            OrderKind::Watch {
                action: EngageAction::Retweet,
                ..
            } => Operation::RetweetWatch,
        }
    }

    /// Positional arguments of the scheduled function
    pub fn args(&self) -> Vec<String> {
        match self {
            OrderKind::Relationship { .. } => Vec::new(),
            OrderKind::Search { hashtag, .. } => vec![hashtag.clone()],
            OrderKind::Watch { usernames, .. } => usernames.clone(),
        }
    }

    /// Keyword parameters of the scheduled function
    pub fn params(&self) -> OrderParams {
        match self {
            OrderKind::Relationship { action, exclude } => OrderParams {
                func: action.as_str().to_string(),
                exclude: Some(exclude.clone()),
                search_style: None,
                minimum_favorite: None,
                minimum_retweet: None,
            },
            OrderKind::Search {
                action,
                style,
                thresholds,
                ..
            } => OrderParams {
                func: action.as_str().to_string(),
                exclude: None,
                search_style: Some(style.as_i32()),
                minimum_favorite: thresholds.minimum_favorite,
                minimum_retweet: thresholds.minimum_retweet,
            },
            OrderKind::Watch {
                action, thresholds, ..
            } => OrderParams {
                func: action.as_str().to_string(),
                exclude: None,
                search_style: None,
                minimum_favorite: thresholds.minimum_favorite,
                minimum_retweet: thresholds.minimum_retweet,
            },
        }
    }

    /// Human readable description, also used in duplicate warnings
    pub fn label(&self) -> String {
        match self {
            OrderKind::Relationship { action, .. } => {
                format!("{} back: runs hourly", action)
            }
            OrderKind::Search {
                action, hashtag, ..
            } => {
                format!("search for {} and {} - hourly", hashtag, action)
            }
            OrderKind::Watch {
                action, usernames, ..
            } => {
                let watched = usernames
                    .iter()
                    .map(|u| format!("@{}", u))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("watch {} and {} - hourly", watched, action)
            }
        }
    }
}

/// OrderParams is the persisted keyword-parameter record of a descriptor
///
/// Absent parameters are omitted from the serialized form so stored
/// records compare equal regardless of which optional keys were supplied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderParams {
    pub func: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_style: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_favorite: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_retweet: Option<u32>,
}

/// OrderDescriptor is the canonical unit of schedulable work
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderDescriptor {
    pub id: Uuid,
    pub owner: OwnerId,
    pub kind: OrderKind,
    pub label: String,
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
}

impl OrderDescriptor {
    /// Create a recurring descriptor with a derived label
    ///
    /// The label is never caller-settable; it is deterministically derived
    /// from the kind so duplicate warnings can name the colliding order.
    pub fn new(owner: OwnerId, kind: OrderKind) -> Self {
        let label = kind.label();
        Self {
            id: Uuid::new_v4(),
            owner,
            kind,
            label,
            recurring: true,
            created_at: Utc::now(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.kind.operation()
    }

    pub fn args(&self) -> Vec<String> {
        self.kind.args()
    }

    pub fn params(&self) -> OrderParams {
        self.kind.params()
    }

    /// Whether the descriptor references the given account in its args
    pub fn watches(&self, username: &str) -> bool {
        match &self.kind {
            OrderKind::Watch { usernames, .. } => usernames.iter().any(|u| u == username),
            _ => false,
        }
    }
}
