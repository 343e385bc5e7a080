use std::{
	future::Future,
	hash::Hash,
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
	time::Duration,
};

use moka::future::Cache;

/// A bounded key-to-result map for query responses.
///
/// Concurrent callers for the same key share one fetch. Entries expire after
/// `ttl`, and the least useful entries are evicted once `capacity` is
/// reached.
///
/// Keys are stored under the current generation. [`QueryCache::invalidate_all`]
/// moves to the next generation, so a fetch that was in flight when the cache
/// was invalidated still answers its waiters but is never read again.
pub struct QueryCache<K, V> {
	generation: AtomicU64,
	entries: Cache<(u64, K), V>,
}

impl<K, V> QueryCache<K, V>
where
	K: Eq + Hash + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	pub fn new(ttl: Duration, capacity: u64) -> Self {
		Self {
			generation: AtomicU64::new(0),
			entries: Cache::builder()
				.max_capacity(capacity)
				.time_to_live(ttl)
				.build(),
		}
	}

	/// Returns the cached value for `key`, awaiting `fetch` on a miss.
	///
	/// A failed fetch is shared with the callers waiting on it and is not
	/// cached, so the next call fetches again.
	pub async fn get_or_fetch<F, E>(&self, key: K, fetch: F) -> Result<V, Arc<E>>
	where
		F: Future<Output = Result<V, E>>,
		E: Send + Sync + 'static,
	{
		let generation = self.generation.load(Ordering::Acquire);

		self.entries.try_get_with((generation, key), fetch).await
	}

	/// Drops every entry.
	pub fn invalidate_all(&self) {
		self.generation.fetch_add(1, Ordering::AcqRel);
		self.entries.invalidate_all();
	}

	/// The number of live entries, after pending evictions have run.
	pub async fn len(&self) -> u64 {
		self.entries.run_pending_tasks().await;
		self.entries.entry_count()
	}
}
