use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user profile document.
///
/// `followers` and `following` are membership arrays with set semantics,
/// maintained exclusively through the atomic set operations of the store
/// adapter. For any pair (a, b), `b ∈ a.following ⟺ a ∈ b.followers`,
/// except transiently after a reported partial follow write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
}

/// A published post with its embedded engagement state.
///
/// `author_display_name` is a snapshot taken at creation time and is never
/// re-synced when the author renames. After any committed mutation,
/// `likes_count == liked_by.len()` and `comments_count == comments.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub author_id: String,
    pub author_display_name: String,
    pub content: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub comments_count: i64,
}

/// A comment embedded in a post's append-only log. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub author_id: String,
    pub author_display_name: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
