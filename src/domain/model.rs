use serde::{Deserialize, Serialize};

/// One generated trend entry. Immutable once parsed; a regeneration replaces
/// the whole batch rather than patching individual items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionCategory {
    pub id: String,
    pub name: String,
}

/// Constructed once per run and submitted exactly once.
#[derive(Debug, Clone)]
pub struct DiscussionPost {
    pub repository_id: String,
    pub category_id: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct PublishedDiscussion {
    pub id: String,
    pub url: String,
}

/// What the link validator decided for one unique URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCheckOutcome {
    Alive,
    Replaced { new_url: String },
    Stripped,
}
