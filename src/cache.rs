//! Access-token cache contract and the in-memory implementation.
//!
//! The connector treats the cache as authoritative: a token returned by
//! [`AccessTokenCache::fetch_access_token`] is used as-is, and expiry is entirely the
//! backend's business. The connector only reads and unconditionally writes entries.

pub mod memory;

pub use memory::MemoryCache;

// self
use crate::{_prelude::*, auth::{AccessToken, ScopeSet}};

/// Boxed future returned by [`AccessTokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key-value backend holding access tokens between requests.
pub trait AccessTokenCache
where
	Self: Send + Sync,
{
	/// Returns the token cached under `key`, if the backend still considers it valid.
	fn fetch_access_token<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<AccessToken>>;

	/// Stores `token` under `key`, replacing any previous entry.
	fn cache_access_token<'a>(&'a self, key: &'a CacheKey, token: AccessToken) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`AccessTokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CacheError {
	/// Backend-level failure for the storage engine.
	#[error("Cache backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Cache key for one scope set requested by one client: `<scope digest>-<client id>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);
impl CacheKey {
	/// Derives the key for `scope` requested by `client_id`.
	pub fn new(scope: &ScopeSet, client_id: &str) -> Self {
		Self(format!("{}-{client_id}", scope.digest()))
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for CacheKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
