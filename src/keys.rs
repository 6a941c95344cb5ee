/// Names of the collections plaza owns inside the store.
pub mod collections {
    pub const POSTS: &str = "posts";
    pub const PROFILES: &str = "profiles";
}

/// Separator between the display name and the user id inside lex index
/// members. U+001F sorts below every printable character, so the member
/// still orders by display name.
pub const LEX_MEMBER_SEPARATOR: char = '\u{1f}';

/// Key construction for every Redis structure plaza touches.
#[derive(Debug, Clone)]
pub struct KeyContext {
    prefix: String,
    service: String,
}

impl KeyContext {
    pub fn new(prefix: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
        }
    }

    /// JSON document key.
    pub fn document(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, self.service, collection, id)
    }

    /// Sorted set of document ids scored by creation time.
    pub fn recency_index(&self, collection: &str) -> String {
        format!("{}:{}:{}:index", self.prefix, self.service, collection)
    }

    /// Lexicographic index of profile display names (`name\u{1F}user_id`, score 0).
    pub fn display_index(&self) -> String {
        format!("{}:{}:{}:by_display_name", self.prefix, self.service, collections::PROFILES)
    }

    /// Pub/sub channel carrying change notifications for a collection.
    pub fn channel(&self, collection: &str) -> String {
        format!("{}:{}:{}:events", self.prefix, self.service, collection)
    }
}

/// Builds a lex index member for a display name.
pub fn lex_member(display_name: &str, user_id: &str) -> String {
    format!("{display_name}{LEX_MEMBER_SEPARATOR}{user_id}")
}

/// Splits a lex index member back into (display name, user id).
pub fn split_lex_member(member: &str) -> Option<(&str, &str)> {
    member.rsplit_once(LEX_MEMBER_SEPARATOR)
}
