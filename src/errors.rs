use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by plaza managers and the store adapter.
#[derive(Debug, Error)]
pub enum SocialError {
    /// Validation failed before any write was issued.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// The action requires an authenticated identity and none is present.
    #[error("not signed in")]
    Unauthenticated,

    /// A follow action targeted the acting user.
    #[error("cannot follow yourself")]
    SelfFollow,

    /// Referenced post or profile does not exist.
    #[error("no such document in '{collection}': {id}")]
    NotFound { collection: &'static str, id: String },

    /// The first half of a follow dual-write committed and the second did
    /// not. Both halves are idempotent set operations, so retrying only the
    /// second one (`SocialGraph::repair_follow_write`) converges the pair
    /// without re-toggling the first side.
    #[error("follow edge half-written: {observer_id} -> {target_id}")]
    PartialWrite {
        observer_id: String,
        target_id: String,
        /// End state the caller intended: `true` means the edge should exist.
        following: bool,
        source: Box<SocialError>,
    },

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Store(#[from] redis::RedisError),

    /// Malformed data or reply coming back from the store.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl SocialError {
    pub(crate) fn other(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Collection of validation issues encountered while preparing a mutation.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Rejects empty or whitespace-only user-supplied text before any write.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::single(field, "required", format!("{field} must not be empty")));
    }
    Ok(())
}
