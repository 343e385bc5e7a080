use super::{CacheSettings, Error, Tables};
use crate::{
	cache::QueryCache,
	model::Story,
	store::{self, Embed, Select, Store},
};

/// The most stories the rail shows.
pub const STORIES_LIMIT: u64 = 10;

/// The stories rail: recent posts that carry an image.
pub struct Stories {
	store: Store,
	tables: Tables,
	cache: QueryCache<(), Vec<Story>>,
}

impl Stories {
	pub fn new(store: Store, tables: Tables, cache: CacheSettings) -> Self {
		Self {
			store,
			tables,
			cache: QueryCache::new(cache.ttl, 1),
		}
	}

	/// Returns up to ten stories, newest first.
	///
	/// Stories are secondary content, so a failed query is logged and
	/// answered with an empty rail. The failure is not cached.
	pub async fn list(&self) -> Vec<Story> {
		match self.cache.get_or_fetch((), self.fetch()).await {
			Ok(stories) => stories,
			Err(error) => {
				tracing::warn!(%error, "stories query failed");
				Vec::new()
			}
		}
	}

	async fn fetch(&self) -> Result<Vec<Story>, Error> {
		let select = Select::from(&self.tables.posts)
			.columns(["id", "title", "image_url"])
			.embed(
				Embed::new(&self.tables.accounts, "account_id").columns(["name", "picture_url"]),
			)
			.not_null("image_url")
			.order("created_at", false)
			.order("id", false)
			.limit(STORIES_LIMIT);

		let mut stories = self
			.store
			.select(select)
			.await?
			.rows
			.into_iter()
			.map(|mut row| {
				// the embed is keyed by the accounts table name
				if let Some(author) = row.remove(&self.tables.accounts) {
					row.insert("accounts".into(), author);
				}

				store::from_row::<Story>(row)
			})
			.collect::<Result<Vec<_>, _>>()?;

		stories.truncate(STORIES_LIMIT as usize);

		Ok(stories)
	}
}
