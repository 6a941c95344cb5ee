//! Social Graph Manager: the bidirectional follow relationship.
//!
//! A follow edge lives in two documents: the observer's `following` array
//! and the target's `followers` array. The two writes are issued
//! separately (the store's atomicity stops at one document), so a failure
//! between them leaves the graph asymmetric until repaired. Both halves are
//! idempotent set operations, so re-applying only the failed half converges
//! the pair without duplicate side effects.

use std::sync::Arc;

use log::warn;
use serde_json::{Value, json};

use crate::{
    auth::{AuthProvider, require_user},
    errors::{SocialError, require_text},
    keys::collections::PROFILES,
    model::Profile,
    store::{DocumentStore, commands::UpdatePlan},
};

const FOLLOWING_FIELD: &str = "following";
const FOLLOWERS_FIELD: &str = "followers";

/// Result of a follow toggle: the edge state after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowOutcome {
    pub following: bool,
}

pub struct SocialGraph {
    store: DocumentStore,
    auth: Arc<dyn AuthProvider>,
}

impl SocialGraph {
    pub fn new(store: DocumentStore, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    /// Point read of one profile.
    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>, SocialError> {
        self.store.read_document(PROFILES, user_id).await
    }

    /// Whether `observer_id` currently follows `target_id`. Pure read;
    /// an absent profile reads as "not following".
    pub async fn is_following(&self, observer_id: &str, target_id: &str) -> Result<bool, SocialError> {
        Ok(self
            .profile(observer_id)
            .await?
            .map(|profile| profile.following.iter().any(|id| id == target_id))
            .unwrap_or(false))
    }

    /// Follows or unfollows `target_id` as the current user.
    ///
    /// Fails with [`SocialError::SelfFollow`] before any write when the
    /// target is the actor. On a failed second half the error is
    /// [`SocialError::PartialWrite`], carrying everything needed to retry
    /// just that half via [`SocialGraph::repair_follow_write`]; a plain
    /// store error means nothing was applied.
    pub async fn toggle_follow(&self, target_id: &str) -> Result<FollowOutcome, SocialError> {
        let actor = require_user(self.auth.as_ref())?;
        if actor.user_id == target_id {
            return Err(SocialError::SelfFollow);
        }

        let following = !self.is_following(&actor.user_id, target_id).await?;

        self.write_following_leg(&actor.user_id, target_id, following).await?;
        if let Err(source) = self.write_followers_leg(&actor.user_id, target_id, following).await {
            warn!("followers write failed after following write committed: {} -> {target_id}", actor.user_id);
            return Err(SocialError::PartialWrite {
                observer_id: actor.user_id,
                target_id: target_id.to_string(),
                following,
                source: Box::new(source),
            });
        }

        Ok(FollowOutcome { following })
    }

    /// Re-applies only the `followers` half of a follow dual-write reported
    /// as [`SocialError::PartialWrite`]. Safe to call any number of times;
    /// the set semantics make it a no-op once the pair is symmetric.
    pub async fn repair_follow_write(
        &self,
        observer_id: &str,
        target_id: &str,
        following: bool,
    ) -> Result<(), SocialError> {
        self.write_followers_leg(observer_id, target_id, following).await
    }

    /// Writes display name and bio for the current user, creating the
    /// profile document when absent. This is the lazy-creation write path:
    /// there is no explicit "create profile" event anywhere.
    pub async fn save_profile(&self, display_name: &str, bio: &str) -> Result<(), SocialError> {
        let actor = require_user(self.auth.as_ref())?;
        require_text("display_name", display_name)?;

        let seed = json!({
            "user_id": actor.user_id,
            "display_name": display_name,
            "bio": bio,
            "followers": [],
            "following": [],
        });
        self.store.save_profile(&actor.user_id, display_name, bio, &seed).await
    }

    async fn write_following_leg(&self, observer_id: &str, target_id: &str, add: bool) -> Result<(), SocialError> {
        let plan = edge_plan(FOLLOWING_FIELD, observer_id, target_id, add);
        self.store.atomic_update(PROFILES, observer_id, plan).await?;
        Ok(())
    }

    async fn write_followers_leg(&self, observer_id: &str, target_id: &str, add: bool) -> Result<(), SocialError> {
        let plan = edge_plan(FOLLOWERS_FIELD, target_id, observer_id, add);
        self.store.atomic_update(PROFILES, target_id, plan).await?;
        Ok(())
    }
}

/// One half of the dual write: an idempotent set op on a profile document,
/// seeding a skeleton when the profile has never been written.
fn edge_plan(field: &str, owner_id: &str, member: &str, add: bool) -> UpdatePlan {
    let plan = UpdatePlan::new().ensure(&skeleton(owner_id));
    if add {
        plan.set_add(field, member)
    } else {
        plan.set_remove(field, member)
    }
}

fn skeleton(user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "display_name": "",
        "bio": "",
        "followers": [],
        "following": [],
    })
}
