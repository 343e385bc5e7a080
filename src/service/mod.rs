//! Feed, post, story and session services.
//!
//! Routes call these; they in turn talk to the [`DataStore`](crate::store::DataStore)
//! and own the query caches.

pub mod auth;
pub mod feed;
pub mod post;
pub mod stories;

use std::{sync::Arc, time::Duration};

use uuid::{uuid, Uuid};

use crate::store;

pub use auth::Auth;
pub use feed::{Feed, FeedQuery};
pub use post::{CreatePost, Posts, UpdatePost};
pub use stories::Stories;

/// Challenge assigned to posts created without one.
pub const DEFAULT_CHALLENGE_ID: Uuid = uuid!("73722bf4-4213-4feb-8848-bbb5ef422989");

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("User not authenticated")]
	NotAuthenticated,
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("nothing to update")]
	EmptyUpdate,
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error(transparent)]
	Store(#[from] store::Error),
	/// A failure shared between callers waiting on the same cached query.
	#[error(transparent)]
	Shared(Arc<Error>),
}

impl Error {
	/// Takes the error back out of a cached fetch, keeping it shared only
	/// while another caller still holds it.
	pub fn unshare(error: Arc<Self>) -> Self {
		Arc::try_unwrap(error).unwrap_or_else(Self::Shared)
	}
}

/// Names of the tables the services read and write.
///
/// Every path uses the same posts table, reads and mutations alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
	pub posts: String,
	pub accounts: String,
	pub sessions: String,
}

impl Default for Tables {
	fn default() -> Self {
		Self {
			posts: "log_activites".into(),
			accounts: "accounts".into(),
			sessions: "sessions".into(),
		}
	}
}

/// Lifetime and size bound of each query cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
	pub ttl: Duration,
	/// The most entries a cache holds before evicting.
	pub capacity: u64,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self {
			ttl: Duration::from_secs(60),
			capacity: 1_000,
		}
	}
}

#[derive(Debug, Clone)]
pub struct Settings {
	pub tables: Tables,
	pub default_challenge_id: Uuid,
	pub cache: CacheSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			tables: Tables::default(),
			default_challenge_id: DEFAULT_CHALLENGE_ID,
			cache: CacheSettings::default(),
		}
	}
}
