use super::support::*;

use plaza::{
    SocialError, SocialGraph, StaticSession, invariants,
    store::commands::UpdatePlan,
};
use serde_json::json;

#[tokio::test]
async fn follow_creates_symmetric_edges() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    let outcome = graph.toggle_follow("B").await.expect("follow");
    assert!(outcome.following);

    assert!(graph.is_following("A", "B").await.expect("is_following"));
    let target = graph.profile("B").await.expect("read").expect("profile seeded");
    assert!(target.followers.contains(&"A".to_string()));

    let violations = invariants::check_follow_symmetry(&store, "A", "B").await.expect("check");
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

#[tokio::test]
async fn unfollow_removes_both_sides() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    graph.toggle_follow("B").await.expect("follow");
    let outcome = graph.toggle_follow("B").await.expect("unfollow");
    assert!(!outcome.following);

    assert!(!graph.is_following("A", "B").await.expect("is_following"));
    let observer = graph.profile("A").await.expect("read").expect("profile");
    let target = graph.profile("B").await.expect("read").expect("profile");
    assert!(observer.following.is_empty());
    assert!(target.followers.is_empty());

    let violations = invariants::check_follow_symmetry(&store, "A", "B").await.expect("check");
    assert!(violations.is_empty());
}

#[tokio::test]
async fn self_follow_is_rejected_without_state_change() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    let err = graph.toggle_follow("A").await.expect_err("self follow");
    assert!(matches!(err, SocialError::SelfFollow));

    assert!(graph.profile("A").await.expect("read").is_none(), "no profile may be seeded");
}

#[tokio::test]
async fn follow_requires_identity() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = SocialGraph::new(store.clone(), Arc::new(StaticSession::signed_out()));

    let err = graph.toggle_follow("B").await.expect_err("signed out");
    assert!(matches!(err, SocialError::Unauthenticated));
}

#[tokio::test]
async fn profiles_are_seeded_lazily_on_first_follow() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    assert!(graph.profile("A").await.expect("read").is_none());
    assert!(graph.profile("B").await.expect("read").is_none());

    graph.toggle_follow("B").await.expect("follow");

    let observer = graph.profile("A").await.expect("read").expect("observer seeded");
    let target = graph.profile("B").await.expect("read").expect("target seeded");
    assert_eq!(observer.display_name, "");
    assert_eq!(target.display_name, "");
    assert_eq!(observer.following, vec!["B".to_string()]);
    assert_eq!(target.followers, vec!["A".to_string()]);
}

#[tokio::test]
async fn is_following_defaults_false_for_absent_profiles() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    assert!(!graph.is_following("A", "B").await.expect("is_following"));
    assert!(!graph.is_following("ghost", "B").await.expect("is_following"));
}

#[tokio::test]
async fn repair_converges_a_half_written_follow() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    // Apply only the first half of the dual write, the state a failed
    // second leg leaves behind.
    let seed = json!({
        "user_id": "A",
        "display_name": "",
        "bio": "",
        "followers": [],
        "following": [],
    });
    let plan = UpdatePlan::new().ensure(&seed).set_add("following", "B");
    store
        .atomic_update(plaza::keys::collections::PROFILES, "A", plan)
        .await
        .expect("first leg");

    let violations = invariants::check_follow_symmetry(&store, "A", "B").await.expect("check");
    assert!(!violations.is_empty(), "half-applied write must be visible as asymmetry");

    graph.repair_follow_write("A", "B", true).await.expect("repair");

    let violations = invariants::check_follow_symmetry(&store, "A", "B").await.expect("check");
    assert!(violations.is_empty(), "repair must converge the pair: {violations:?}");
    let target = graph.profile("B").await.expect("read").expect("profile");
    assert_eq!(target.followers, vec!["A".to_string()]);
}

#[tokio::test]
async fn repair_is_idempotent() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "A", "Ana");

    graph.toggle_follow("B").await.expect("follow");
    graph.repair_follow_write("A", "B", true).await.expect("repair once");
    graph.repair_follow_write("A", "B", true).await.expect("repair twice");

    let target = graph.profile("B").await.expect("read").expect("profile");
    assert_eq!(target.followers, vec!["A".to_string()], "retries must not duplicate membership");
}

#[tokio::test]
async fn save_profile_round_trips_and_merges() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "u1", "Ana");

    graph.save_profile("Ana", "exploring").await.expect("save");
    let profile = graph.profile("u1").await.expect("read").expect("profile");
    assert_eq!(profile.display_name, "Ana");
    assert_eq!(profile.bio, "exploring");
    assert!(profile.created_at.timestamp_millis() > 0);

    // A later save merges fields without touching follow state.
    graph_as(&store, "u2", "Bea").toggle_follow("u1").await.expect("follow");
    graph.save_profile("Ana", "still exploring").await.expect("save again");

    let profile = graph.profile("u1").await.expect("read").expect("profile");
    assert_eq!(profile.bio, "still exploring");
    assert_eq!(profile.followers, vec!["u2".to_string()]);
}

#[tokio::test]
async fn save_profile_rejects_blank_display_name() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "u1", "Ana");

    let err = graph.save_profile("  ", "bio").await.expect_err("blank name");
    assert!(matches!(err, SocialError::Validation(_)));
    assert!(graph.profile("u1").await.expect("read").is_none());
}
