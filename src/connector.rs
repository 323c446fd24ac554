//! The service connector: token acquisition plus authenticated platform service calls.

pub mod request;

mod access_token;
mod pagination;
mod service_request;

pub use request::*;

// self
use crate::{
	_prelude::*,
	cache::AccessTokenCache,
	http::ServiceHttpClient,
	registration::Registration,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Timeout applied to token endpoint exchanges.
pub const TOKEN_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// Timeout applied to platform service requests.
pub const SERVICE_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(60);

#[cfg(feature = "reqwest")]
/// Connector specialized for the crate's default reqwest transport.
pub type ReqwestServiceConnector = ServiceConnector<ReqwestHttpClient>;

/// Obtains access tokens for one registration and signs platform service calls with them.
///
/// The connector owns no global state: the registration, the token cache, and the HTTP
/// transport are all injected. Tokens are looked up in the cache by scope set and client id;
/// on a miss the connector signs a fresh client assertion, exchanges it at the registration's
/// token endpoint, and writes the result back to the cache. Concurrent misses for the same key
/// each perform their own exchange and the last write wins.
pub struct ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// HTTP transport used for token exchanges and service calls.
	pub http_client: Arc<C>,
	/// Registration supplying client id, audience, token endpoint, and signing key.
	pub registration: Arc<dyn Registration>,
	/// Token cache consulted before every exchange.
	pub cache: Arc<dyn AccessTokenCache>,
	/// Timeout for token endpoint exchanges.
	pub token_timeout: StdDuration,
	/// Timeout for service requests.
	pub service_timeout: StdDuration,
}
impl<C> ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Creates a connector that reuses the caller-provided transport.
	pub fn with_http_client(
		registration: Arc<dyn Registration>,
		cache: Arc<dyn AccessTokenCache>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			registration,
			cache,
			token_timeout: TOKEN_REQUEST_TIMEOUT,
			service_timeout: SERVICE_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the token exchange timeout (defaults to 10 seconds).
	pub fn with_token_timeout(mut self, timeout: StdDuration) -> Self {
		self.token_timeout = timeout;

		self
	}

	/// Overrides the service request timeout (defaults to 60 seconds).
	pub fn with_service_timeout(mut self, timeout: StdDuration) -> Self {
		self.service_timeout = timeout;

		self
	}
}
#[cfg(feature = "reqwest")]
impl ServiceConnector<ReqwestHttpClient> {
	/// Creates a connector backed by a default reqwest client.
	pub fn new(registration: Arc<dyn Registration>, cache: Arc<dyn AccessTokenCache>) -> Self {
		Self::with_http_client(registration, cache, ReqwestHttpClient::default())
	}
}
impl<C> Clone for ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			registration: self.registration.clone(),
			cache: self.cache.clone(),
			token_timeout: self.token_timeout,
			service_timeout: self.service_timeout,
		}
	}
}
impl<C> Debug for ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServiceConnector")
			.field("client_id", &self.registration.client_id())
			.field("auth_token_url", &self.registration.auth_token_url().as_str())
			.field("token_timeout", &self.token_timeout)
			.field("service_timeout", &self.service_timeout)
			.finish()
	}
}
