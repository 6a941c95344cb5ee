//! Plaza core library.
//!
//! The social-state consistency engine behind a feed service: posts,
//! likes, comments, and follow edges mutated concurrently by many
//! sessions, with a live ordered feed view and prefix search over display
//! names. State lives in a document store (Redis + RedisJSON) reached
//! through [`store::DocumentStore`]; everything in memory is a read-only
//! projection refreshed by push notification, never authoritative.
//!
//! The correctness story in one paragraph: engagement counters and their
//! membership sets are only ever mutated together, inside one atomic
//! compound write, so they cannot drift apart; follow edges span two
//! documents and are written as two idempotent set operations, so the one
//! failure mode (a half-applied pair, reported as
//! [`errors::SocialError::PartialWrite`]) is repaired by retrying just the
//! missing half.

pub mod auth;
pub mod config;
pub mod directory;
pub mod engagement;
pub mod errors;
pub mod feed;
pub mod graph;
pub mod id;
pub mod invariants;
pub mod keys;
pub mod model;
pub mod store;

pub use auth::{AuthProvider, StaticSession};
pub use config::Config;
pub use directory::{DirectoryEntry, UserDirectory};
pub use engagement::{LikeOutcome, PostEngagement};
pub use errors::{SocialError, ValidationError, ValidationIssue};
pub use feed::{FeedProjector, UpdateHandle};
pub use graph::{FollowOutcome, SocialGraph};
pub use invariants::InvariantViolation;
pub use model::{Comment, Post, Profile};
pub use store::{DocumentStore, SortOrder, Subscription};

// Re-export redis so consumers don't need to depend on a specific version.
pub use redis;
