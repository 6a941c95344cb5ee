//! User Directory: prefix search over profile display names.

use crate::{errors::SocialError, store::DocumentStore};

/// Largest number of entries one search returns. No pagination: callers
/// get the head of the range and nothing else.
const MAX_RESULTS: usize = 100;

/// One directory hit. Display names are not unique, so several entries may
/// carry the same name with different user ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub user_id: String,
    pub display_name: String,
}

pub struct UserDirectory {
    store: DocumentStore,
}

impl UserDirectory {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Case-sensitive prefix search over display names, ordered by name.
    ///
    /// An empty (or whitespace-only) prefix returns an empty result without
    /// touching the store; it would otherwise scan the whole collection.
    pub async fn search_by_display_name_prefix(&self, prefix: &str) -> Result<Vec<DirectoryEntry>, SocialError> {
        if prefix.trim().is_empty() {
            return Ok(Vec::new());
        }

        let upper = prefix_upper_bound(prefix);
        let matches = self.store.query_display_range(prefix, &upper, MAX_RESULTS).await?;
        Ok(matches
            .into_iter()
            .map(|(display_name, user_id)| DirectoryEntry { user_id, display_name })
            .collect())
    }
}

/// Upper bound of the prefix range: the prefix with the maximal code point
/// appended. Every string starting with `prefix` sorts inside
/// `[prefix, bound)`, which turns an ordered range scan into "is a prefix
/// of" semantics.
fn prefix_upper_bound(prefix: &str) -> String {
    format!("{prefix}\u{ffff}")
}
