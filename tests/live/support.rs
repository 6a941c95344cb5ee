pub(crate) use std::sync::Arc;
pub(crate) use std::time::Duration;

pub(crate) use plaza::{
    Config, DocumentStore, PostEngagement, SocialGraph, StaticSession, UserDirectory,
};

use std::sync::atomic::{AtomicUsize, Ordering};

use plaza::id::generate_document_id;

static TEST_NAMESPACE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A unique key prefix per test, so parallel tests never see each other.
pub(crate) struct TestNamespace {
    config: Config,
}

impl TestNamespace {
    pub(crate) fn unique() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let idx = TEST_NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let salt = generate_document_id();
        let prefix = format!("plaza_test_{idx}_{}", &salt[..8]);
        Self {
            config: Config::from_env().with_prefix(prefix),
        }
    }

    pub(crate) async fn store(&self) -> DocumentStore {
        DocumentStore::connect(&self.config).await.expect("document store")
    }
}

pub(crate) fn engagement_as(store: &DocumentStore, user_id: &str, display_name: &str) -> PostEngagement {
    PostEngagement::new(store.clone(), Arc::new(StaticSession::signed_in(user_id, display_name)))
}

pub(crate) fn graph_as(store: &DocumentStore, user_id: &str, display_name: &str) -> SocialGraph {
    SocialGraph::new(store.clone(), Arc::new(StaticSession::signed_in(user_id, display_name)))
}

pub(crate) fn directory(store: &DocumentStore) -> UserDirectory {
    UserDirectory::new(store.clone())
}

/// Polls `condition` until it holds or the timeout elapses.
pub(crate) async fn wait_until<F>(condition: F, timeout: Duration) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
