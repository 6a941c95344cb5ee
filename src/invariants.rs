//! Consistency Invariant Checker.
//!
//! Validates the agreements the engine promises after every committed
//! mutation: engagement counters match their membership sets, comment logs
//! stay chronological, and follow edges stay symmetric. Integration tests
//! run these checks after each mutation path; they are also usable as an
//! operational audit.

use std::collections::BTreeSet;

use crate::{
    errors::SocialError,
    keys::collections::{POSTS, PROFILES},
    model::{Post, Profile},
    store::{DocumentStore, SortOrder},
};

/// A broken invariant, with enough context to locate the offending state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub subject: String,
    pub detail: String,
}

impl InvariantViolation {
    fn new(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

/// Checks one post's counter-vs-set and counter-vs-sequence agreement.
pub fn check_post_engagement(post: &Post) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let subject = format!("post {}", post.post_id);

    if post.likes_count != post.liked_by.len() as i64 {
        violations.push(InvariantViolation::new(
            &subject,
            format!("likes_count {} != |liked_by| {}", post.likes_count, post.liked_by.len()),
        ));
    }

    let distinct: BTreeSet<&String> = post.liked_by.iter().collect();
    if distinct.len() != post.liked_by.len() {
        violations.push(InvariantViolation::new(&subject, "liked_by contains duplicates"));
    }

    if post.comments_count != post.comments.len() as i64 {
        violations.push(InvariantViolation::new(
            &subject,
            format!(
                "comments_count {} != |comments| {}",
                post.comments_count,
                post.comments.len()
            ),
        ));
    }

    let chronological = post.comments.windows(2).all(|pair| pair[0].created_at <= pair[1].created_at);
    if !chronological {
        violations.push(InvariantViolation::new(&subject, "comments are not in chronological order"));
    }

    violations
}

/// Checks the symmetric dual-write invariant for one profile pair, in both
/// directions: `b ∈ a.following ⟺ a ∈ b.followers` and vice versa. Absent
/// profiles read as empty sets.
pub async fn check_follow_symmetry(
    store: &DocumentStore,
    a: &str,
    b: &str,
) -> Result<Vec<InvariantViolation>, SocialError> {
    let profile_a = store.read_document::<Profile>(PROFILES, a).await?;
    let profile_b = store.read_document::<Profile>(PROFILES, b).await?;

    let mut violations = Vec::new();
    check_edge(&mut violations, a, &profile_a, b, &profile_b);
    check_edge(&mut violations, b, &profile_b, a, &profile_a);
    Ok(violations)
}

fn check_edge(
    violations: &mut Vec<InvariantViolation>,
    observer: &str,
    observer_profile: &Option<Profile>,
    target: &str,
    target_profile: &Option<Profile>,
) {
    let follows = observer_profile
        .as_ref()
        .map(|profile| profile.following.iter().any(|id| id == target))
        .unwrap_or(false);
    let listed = target_profile
        .as_ref()
        .map(|profile| profile.followers.iter().any(|id| id == observer))
        .unwrap_or(false);

    if follows != listed {
        violations.push(InvariantViolation::new(
            format!("edge {observer} -> {target}"),
            format!("following={follows} but followers listing={listed}"),
        ));
    }
}

/// Sweeps the whole post collection and reports every engagement violation.
pub async fn audit_posts(store: &DocumentStore) -> Result<Vec<InvariantViolation>, SocialError> {
    let posts = store.load_collection::<Post>(POSTS, SortOrder::Desc).await?;
    Ok(posts.iter().flat_map(check_post_engagement).collect())
}
