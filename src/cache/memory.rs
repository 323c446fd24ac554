//! Thread-safe in-memory [`AccessTokenCache`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	cache::{AccessTokenCache, CacheError, CacheFuture, CacheKey},
};

type CacheMap = Arc<RwLock<HashMap<CacheKey, CachedEntry>>>;

#[derive(Clone, Debug)]
struct CachedEntry {
	token: AccessToken,
	expires_at: Option<OffsetDateTime>,
}
impl CachedEntry {
	fn is_live_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|deadline| now < deadline)
	}
}

/// In-process cache keeping tokens in a shared map.
///
/// Without a TTL entries live until overwritten. With [`MemoryCache::with_ttl`] every write
/// stamps a deadline and reads past that deadline evict the entry and report a miss.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
	entries: CacheMap,
	ttl: Option<Duration>,
}
impl MemoryCache {
	/// Creates a cache whose entries expire `ttl` after they are written.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { entries: Default::default(), ttl: Some(ttl) }
	}

	/// Number of entries currently held, including ones that expired but were not read since.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns true if nothing has been cached.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn fetch_now(map: CacheMap, key: &CacheKey) -> Option<AccessToken> {
		let now = OffsetDateTime::now_utc();

		{
			let guard = map.read();

			match guard.get(key) {
				Some(entry) if entry.is_live_at(now) => return Some(entry.token.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		let mut guard = map.write();

		// Re-check under the write lock; a concurrent writer may have refreshed the entry.
		match guard.get(key) {
			Some(entry) if entry.is_live_at(now) => Some(entry.token.clone()),
			Some(_) => {
				guard.remove(key);

				None
			},
			None => None,
		}
	}

	fn save_now(map: CacheMap, ttl: Option<Duration>, key: CacheKey, token: AccessToken) {
		let expires_at = ttl.map(|ttl| OffsetDateTime::now_utc() + ttl);

		map.write().insert(key, CachedEntry { token, expires_at });
	}
}
impl AccessTokenCache for MemoryCache {
	fn fetch_access_token<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<AccessToken>> {
		let map = self.entries.clone();

		Box::pin(async move { Ok::<_, CacheError>(Self::fetch_now(map, key)) })
	}

	fn cache_access_token<'a>(&'a self, key: &'a CacheKey, token: AccessToken) -> CacheFuture<'a, ()> {
		let map = self.entries.clone();
		let ttl = self.ttl;
		let key = key.to_owned();

		Box::pin(async move {
			Self::save_now(map, ttl, key, token);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ScopeSet;

	fn key(client_id: &str) -> CacheKey {
		let scope = ScopeSet::new(["score", "lineitem"]).expect("Scope fixture should be valid.");

		CacheKey::new(&scope, client_id)
	}

	#[tokio::test]
	async fn save_and_fetch_round_trip() {
		let cache = MemoryCache::default();
		let first = key("client-1");

		assert!(cache.fetch_access_token(&first).await.expect("Fetch should succeed.").is_none());

		cache
			.cache_access_token(&first, AccessToken::new("tok-1"))
			.await
			.expect("Caching a token should succeed.");

		let fetched = cache
			.fetch_access_token(&first)
			.await
			.expect("Fetch should succeed.")
			.expect("Cached token should be present.");

		assert_eq!(fetched.expose(), "tok-1");

		let other = key("client-2");

		assert!(cache.fetch_access_token(&other).await.expect("Fetch should succeed.").is_none());
	}

	#[tokio::test]
	async fn last_writer_wins() {
		let cache = MemoryCache::default();
		let key = key("client-1");

		cache.cache_access_token(&key, AccessToken::new("first")).await.expect("Write should succeed.");
		cache.cache_access_token(&key, AccessToken::new("second")).await.expect("Write should succeed.");

		let fetched = cache
			.fetch_access_token(&key)
			.await
			.expect("Fetch should succeed.")
			.expect("Cached token should be present.");

		assert_eq!(fetched.expose(), "second");
		assert_eq!(cache.len(), 1);
	}

	#[tokio::test]
	async fn expired_entries_read_as_misses_and_are_evicted() {
		let cache = MemoryCache::with_ttl(Duration::ZERO);
		let key = key("client-1");

		cache.cache_access_token(&key, AccessToken::new("stale")).await.expect("Write should succeed.");

		assert_eq!(cache.len(), 1);
		assert!(cache.fetch_access_token(&key).await.expect("Fetch should succeed.").is_none());
		assert!(cache.is_empty());
	}

	#[tokio::test]
	async fn live_entries_survive_within_ttl() {
		let cache = MemoryCache::with_ttl(Duration::hours(1));
		let key = key("client-1");

		cache.cache_access_token(&key, AccessToken::new("fresh")).await.expect("Write should succeed.");

		assert!(cache.fetch_access_token(&key).await.expect("Fetch should succeed.").is_some());
	}
}
