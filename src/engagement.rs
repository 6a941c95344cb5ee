//! Post Engagement Manager: publication, likes, and the comment log.
//!
//! Every mutation here is one atomic compound write against the post
//! document, so the `likes_count == |liked_by|` and
//! `comments_count == |comments|` invariants cannot diverge between the
//! paired field updates, no matter how writes from other sessions
//! interleave.

use std::sync::Arc;

use serde_json::json;

use crate::{
    auth::{AuthProvider, require_user},
    errors::{SocialError, require_text},
    keys::collections::POSTS,
    model::Post,
    store::{DocumentStore, commands::UpdatePlan},
};

/// Result of a like toggle: the membership state after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
}

pub struct PostEngagement {
    store: DocumentStore,
    auth: Arc<dyn AuthProvider>,
}

impl PostEngagement {
    pub fn new(store: DocumentStore, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    /// Publishes a post. The author's display name is denormalized into the
    /// document as a snapshot; later renames do not rewrite it.
    pub async fn create_post(&self, content: &str) -> Result<String, SocialError> {
        let actor = require_user(self.auth.as_ref())?;
        require_text("content", content)?;

        let payload = json!({
            "author_id": actor.user_id,
            "author_display_name": actor.display_name,
            "content": content,
            "liked_by": [],
            "likes_count": 0,
            "comments": [],
            "comments_count": 0,
        });
        self.store.create_document(POSTS, "post_id", payload).await
    }

    /// Flips the current user's membership in the post's `liked_by` set and
    /// moves `likes_count` in step, in one atomic write. The membership
    /// check happens inside that write, so a toggle issued from a stale
    /// view flips the live state exactly once; two retries make a like and
    /// an unlike, never a double-count.
    pub async fn toggle_like(&self, post_id: &str) -> Result<LikeOutcome, SocialError> {
        let actor = require_user(self.auth.as_ref())?;

        let plan = UpdatePlan::new().toggle_member("liked_by", "likes_count", actor.user_id.as_str());
        let toggles = self.store.atomic_update(POSTS, post_id, plan).await?;
        let liked = toggles
            .first()
            .copied()
            .ok_or_else(|| SocialError::other("toggle reply carried no membership result"))?;
        Ok(LikeOutcome { liked })
    }

    /// Appends a comment (stamped with the server write time) and increments
    /// `comments_count`, in one atomic write. The comment log is append-only:
    /// comments are never edited, removed, or individually addressed.
    pub async fn add_comment(&self, post_id: &str, text: &str) -> Result<(), SocialError> {
        let actor = require_user(self.auth.as_ref())?;
        require_text("text", text)?;

        let comment = json!({
            "author_id": actor.user_id,
            "author_display_name": actor.display_name,
            "text": text,
        });
        let plan = UpdatePlan::new()
            .append_stamped("comments", comment, "created_at")
            .increment("comments_count", 1);
        self.store.atomic_update(POSTS, post_id, plan).await?;
        Ok(())
    }

    /// Point read of one post.
    pub async fn post(&self, post_id: &str) -> Result<Option<Post>, SocialError> {
        self.store.read_document(POSTS, post_id).await
    }
}
