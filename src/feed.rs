//! Feed Projector: a live, newest-first view of the post collection.
//!
//! The projector holds one store subscription for its whole lifetime. On
//! every change notification the store delivers a complete re-read of the
//! collection, newest `created_at` first, and the projector replaces its
//! snapshot wholesale. Full-replace is deliberate: it trades redundant
//! reads on large collections for not having to reason about incremental
//! diffing at all.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::task::JoinHandle;

use crate::{
    errors::SocialError,
    keys::collections::POSTS,
    model::Post,
    store::{DocumentStore, SortOrder, Subscription},
};

pub struct FeedProjector {
    subscription: Subscription<Post>,
}

impl FeedProjector {
    /// Subscribes to the post collection and starts projecting.
    pub async fn spawn(store: &DocumentStore) -> Result<Self, SocialError> {
        let subscription = store.subscribe::<Post>(POSTS, SortOrder::Desc).await?;
        Ok(Self { subscription })
    }

    /// Latest known snapshot, newest first. Empty until the first snapshot
    /// has arrived.
    pub fn current_posts(&self) -> Arc<Vec<Post>> {
        self.subscription.latest()
    }

    /// Registers a callback invoked on every snapshot replacement from now
    /// on. The returned handle stops it; see [`UpdateHandle::unsubscribe`].
    pub fn on_update<F>(&self, callback: F) -> UpdateHandle
    where
        F: Fn(&[Post]) + Send + Sync + 'static,
    {
        let mut receiver = self.subscription.watch();
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        let task = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                let snapshot = receiver.borrow_and_update().clone();
                callback(&snapshot);
            }
        });
        UpdateHandle { active, task }
    }

    /// Tears the projection down: the store subscription ends and every
    /// registered callback stops receiving snapshots. Dropping the
    /// projector has the same effect.
    pub fn shutdown(self) {
        self.subscription.unsubscribe();
    }
}

/// Handle to one registered feed callback.
pub struct UpdateHandle {
    active: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl UpdateHandle {
    /// Stops the callback. Safe to call at any time, including while a
    /// notification is being dispatched: an invocation already running may
    /// finish, and none starts afterwards. Dropping the handle has the
    /// same effect.
    pub fn unsubscribe(self) {}
}

impl Drop for UpdateHandle {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}
