use super::support::*;

#[tokio::test]
async fn empty_prefix_short_circuits() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    graph_as(&store, "u1", "Ana").save_profile("Ana", "").await.expect("save");

    let directory = directory(&store);
    assert!(directory.search_by_display_name_prefix("").await.expect("search").is_empty());
    assert!(directory.search_by_display_name_prefix("   ").await.expect("search").is_empty());
}

#[tokio::test]
async fn prefix_matches_names_in_range() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    graph_as(&store, "u1", "Ana").save_profile("Ana", "").await.expect("save");
    graph_as(&store, "u2", "Andres").save_profile("Andres", "").await.expect("save");
    graph_as(&store, "u3", "Beatriz").save_profile("Beatriz", "").await.expect("save");

    let directory = directory(&store);
    let results = directory.search_by_display_name_prefix("An").await.expect("search");
    let names: Vec<&str> = results.iter().map(|entry| entry.display_name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Andres"], "ordered by display name, Beatriz excluded");

    let results = directory.search_by_display_name_prefix("Beatriz").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].user_id, "u3");
}

#[tokio::test]
async fn search_is_case_sensitive() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    graph_as(&store, "u1", "Ana").save_profile("Ana", "").await.expect("save");

    let directory = directory(&store);
    assert!(directory.search_by_display_name_prefix("an").await.expect("search").is_empty());
    assert_eq!(directory.search_by_display_name_prefix("An").await.expect("search").len(), 1);
}

#[tokio::test]
async fn rename_moves_the_index_entry() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    let graph = graph_as(&store, "u1", "Carla");
    graph.save_profile("Carla", "").await.expect("save");

    let directory = directory(&store);
    assert_eq!(directory.search_by_display_name_prefix("Car").await.expect("search").len(), 1);

    graph.save_profile("Karla", "").await.expect("rename");
    assert!(
        directory.search_by_display_name_prefix("Car").await.expect("search").is_empty(),
        "old name must leave the index"
    );
    let results = directory.search_by_display_name_prefix("Kar").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].user_id, "u1");
}

#[tokio::test]
async fn duplicate_display_names_return_every_user() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    graph_as(&store, "u1", "Dana").save_profile("Dana", "").await.expect("save");
    graph_as(&store, "u2", "Dana").save_profile("Dana", "").await.expect("save");

    let directory = directory(&store);
    let results = directory.search_by_display_name_prefix("Dana").await.expect("search");
    assert_eq!(results.len(), 2);
    let mut ids: Vec<&str> = results.iter().map(|entry| entry.user_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["u1", "u2"]);
}

#[tokio::test]
async fn profiles_seeded_by_follow_are_not_searchable() {
    let ns = TestNamespace::unique();
    let store = ns.store().await;
    // A lazily seeded profile has no display name yet; it must not appear
    // under any prefix.
    graph_as(&store, "u1", "Ana").toggle_follow("u2").await.expect("follow");

    let directory = directory(&store);
    assert!(directory.search_by_display_name_prefix("u").await.expect("search").is_empty());
}
