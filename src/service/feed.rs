use uuid::Uuid;

use super::{CacheSettings, Error};
use crate::{
	cache::QueryCache,
	model::{FeedPage, Post},
	store::{self, Select, Store},
};

/// Which page of which feed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedQuery {
	/// Zero-based page index.
	pub page: u32,
	/// Rows per page, at least one.
	pub limit: u32,
	/// Restrict the feed to one account's posts.
	pub account_id: Option<Uuid>,
}

impl Default for FeedQuery {
	fn default() -> Self {
		Self {
			page: 0,
			limit: FeedQuery::DEFAULT_LIMIT,
			account_id: None,
		}
	}
}

impl FeedQuery {
	pub const DEFAULT_LIMIT: u32 = 10;

	pub fn page(page: u32, limit: u32) -> Self {
		Self {
			page,
			limit,
			account_id: None,
		}
	}

	/// The inclusive row range `[page * limit, page * limit + limit - 1]`.
	pub fn range(&self) -> (u64, u64) {
		let limit = u64::from(self.limit.max(1));
		let from = u64::from(self.page) * limit;

		(from, from + limit - 1)
	}
}

/// Reverse-chronological, paginated listing of posts.
pub struct Feed {
	store: Store,
	table: String,
	pages: QueryCache<FeedQuery, FeedPage>,
}

impl Feed {
	pub fn new(store: Store, table: String, cache: CacheSettings) -> Self {
		Self {
			store,
			table,
			pages: QueryCache::new(cache.ttl, cache.capacity),
		}
	}

	/// Returns one page of the feed, from the cache when possible.
	#[tracing::instrument(skip(self), err)]
	pub async fn page(&self, query: FeedQuery) -> Result<FeedPage, Error> {
		self.pages
			.get_or_fetch(query, self.fetch(query))
			.await
			.map_err(Error::unshare)
	}

	/// Drops every cached page so the next read goes to the store.
	pub fn invalidate(&self) {
		self.pages.invalidate_all();

		tracing::debug!("invalidated feed pages");
	}

	async fn fetch(&self, query: FeedQuery) -> Result<FeedPage, Error> {
		let (from, to) = query.range();

		let mut select = Select::from(&self.table)
			.order("created_at", false)
			.order("id", false)
			.range(from, to)
			.count_exact();

		if let Some(account_id) = query.account_id {
			select = select.eq("account_id", account_id.to_string());
		}

		let selected = self.store.select(select).await?;
		let data = selected
			.rows
			.into_iter()
			.map(store::from_row::<Post>)
			.collect::<Result<Vec<_>, _>>()?;

		let total_count = selected.count.unwrap_or(0);
		let has_more = to + 1 < total_count;

		Ok(FeedPage {
			data,
			has_more,
			total_count,
			next_page: has_more.then(|| query.page + 1),
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test::*;

	#[test]
	fn test_range() {
		assert_eq!(FeedQuery::page(0, 10).range(), (0, 9));
		assert_eq!(FeedQuery::page(2, 10).range(), (20, 29));
		assert_eq!(FeedQuery::page(3, 0).range(), (3, 3));
	}

	#[tokio::test]
	async fn test_pages_over_twenty_five_posts() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		let titles = seed_posts(&store, account.id, 25).await;
		let feed = Feed::new(store.clone(), "log_activites".into(), CACHE);

		let first = feed.page(FeedQuery::page(0, 10)).await.unwrap();
		assert_eq!(first.data.len(), 10);
		assert!(first.has_more);
		assert_eq!(first.total_count, 25);
		assert_eq!(first.next_page, Some(1));
		// newest first
		assert_eq!(first.data[0].title, titles[24]);
		assert_eq!(first.data[9].title, titles[15]);

		let last = feed.page(FeedQuery::page(2, 10)).await.unwrap();
		assert_eq!(last.data.len(), 5);
		assert!(!last.has_more);
		assert_eq!(last.next_page, None);
		assert_eq!(last.data[4].title, titles[0]);
	}

	#[tokio::test]
	async fn test_has_more_is_false_on_exact_boundary() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		seed_posts(&store, account.id, 20).await;
		let feed = Feed::new(store.clone(), "log_activites".into(), CACHE);

		let page = feed.page(FeedQuery::page(1, 10)).await.unwrap();

		assert_eq!(page.data.len(), 10);
		assert!(!page.has_more);
	}

	#[tokio::test]
	async fn test_empty_feed() {
		let store = memory_store();
		let feed = Feed::new(store.clone(), "log_activites".into(), CACHE);

		let page = feed.page(FeedQuery::default()).await.unwrap();

		assert!(page.data.is_empty());
		assert!(!page.has_more);
		assert_eq!(page.total_count, 0);
	}

	#[tokio::test]
	async fn test_refetch_is_idempotent_and_cached() {
		let store = memory_store();
		let account = seed_account(&store, "Ada").await;
		seed_posts(&store, account.id, 12).await;
		let feed = Feed::new(store.clone(), "log_activites".into(), CACHE);

		let requests = store.requests();
		let first = feed.page(FeedQuery::default()).await.unwrap();
		let second = feed.page(FeedQuery::default()).await.unwrap();
		assert_eq!(first, second);
		assert_eq!(store.requests(), requests + 1);

		feed.invalidate();
		let third = feed.page(FeedQuery::default()).await.unwrap();
		assert_eq!(first, third);
		assert_eq!(store.requests(), requests + 2);
	}

	#[tokio::test]
	async fn test_page_cache_is_bounded() {
		let store = memory_store();
		let feed = Feed::new(
			store.clone(),
			"log_activites".into(),
			CacheSettings {
				ttl: MINUTE,
				capacity: 50,
			},
		);

		for page in 0..2000 {
			feed.page(FeedQuery::page(page, 10)).await.unwrap();
		}

		assert!(feed.pages.len().await <= 50);
	}

	#[tokio::test]
	async fn test_account_filter() {
		let store = memory_store();
		let ada = seed_account(&store, "Ada").await;
		let bob = seed_account(&store, "Bob").await;
		seed_posts(&store, ada.id, 3).await;
		seed_posts(&store, bob.id, 2).await;
		let feed = Feed::new(store.clone(), "log_activites".into(), CACHE);

		let page = feed
			.page(FeedQuery {
				account_id: Some(bob.id),
				..FeedQuery::default()
			})
			.await
			.unwrap();

		assert_eq!(page.total_count, 2);
		assert!(page.data.iter().all(|post| post.account_id == bob.id));
	}

	#[tokio::test]
	async fn test_store_error_carries_message_and_is_not_cached() {
		let store = memory_store();
		let feed = Feed::new(store.clone(), "log_activites".into(), CACHE);

		store.fail_next("connection reset").await;

		let error = feed.page(FeedQuery::default()).await.unwrap_err();
		assert_eq!(error.to_string(), "connection reset");

		assert!(feed.page(FeedQuery::default()).await.is_ok());
	}

	#[tokio::test]
	async fn test_misnamed_table_surfaces_store_error() {
		let store = memory_store();
		let feed = Feed::new(store.clone(), "log_activite".into(), CACHE);

		let error = feed.page(FeedQuery::default()).await.unwrap_err();

		assert_eq!(error.to_string(), "relation \"log_activite\" does not exist");
	}
}
