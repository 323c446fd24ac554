//! Cache-first access token acquisition via the signed-JWT client-credentials grant.
//!
//! [`ServiceConnector::fetch_access_token`] looks the scope set up in the cache and returns a
//! hit without touching the network. On a miss it builds a one-shot client assertion, posts it
//! to the registration's token endpoint, and caches the returned token. No expiry is passed to
//! the cache; its own eviction policy decides how long the token is served.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AssertionClaims, CLIENT_ASSERTION_TYPE, ScopeSet},
	cache::CacheKey,
	connector::ServiceConnector,
	error::{ConfigError, TokenExchangeError},
	http::ServiceHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};

#[derive(Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
}

impl<C> ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Returns a bearer token valid for `scopes`, from the cache when possible.
	pub async fn fetch_access_token(&self, scopes: &ScopeSet) -> Result<AccessToken> {
		const KIND: OperationKind = OperationKind::AccessToken;

		let span = OperationSpan::new(KIND, "fetch_access_token");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let key = self.cache_key(scopes);

				if let Some(token) = self.cache.fetch_access_token(&key).await? {
					obs::record_outcome(KIND, OperationOutcome::CacheHit);
					#[cfg(feature = "tracing")]
					tracing::debug!(cache_key = %key, "Serving access token from cache.");

					return Ok(token);
				}

				obs::record_outcome(KIND, OperationOutcome::CacheMiss);
				#[cfg(feature = "tracing")]
				tracing::debug!(cache_key = %key, scope = %scopes, "Exchanging client assertion.");

				let token = self.exchange_client_assertion(scopes).await?;

				self.cache.cache_access_token(&key, token.clone()).await?;

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Cache key under which tokens for `scopes` are stored for this registration.
	pub fn cache_key(&self, scopes: &ScopeSet) -> CacheKey {
		CacheKey::new(scopes, self.registration.client_id())
	}

	async fn exchange_client_assertion(&self, scopes: &ScopeSet) -> Result<AccessToken> {
		let registration = self.registration.as_ref();
		let assertion =
			AssertionClaims::new(registration, OffsetDateTime::now_utc()).sign(registration)?;
		let request = Request::builder()
			.method(Method::POST)
			.uri(registration.auth_token_url().as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(token_request_form(&assertion, scopes).into_bytes())
			.map_err(ConfigError::from)?;
		let handle = self.http_client.with_timeout(self.token_timeout);
		let response = handle.call(request).await.map_err(TokenExchangeError::transport)?;
		let status = response.status();

		#[cfg(feature = "tracing")]
		{
			tracing::debug!(status = status.as_u16(), "Token endpoint responded.");
			tracing::trace!(body = %String::from_utf8_lossy(response.body()), "Token endpoint response body.");
		}

		if !status.is_success() {
			return Err(TokenExchangeError::Rejected {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			}
			.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let parsed: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TokenExchangeError::MalformedResponse {
				source,
				status: status.as_u16(),
			})?;

		Ok(AccessToken::new(parsed.access_token))
	}
}

/// Encodes the form body of a client-credentials exchange authenticated by `assertion`.
pub(crate) fn token_request_form(assertion: &str, scopes: &ScopeSet) -> String {
	FormSerializer::new(String::new())
		.append_pair("grant_type", "client_credentials")
		.append_pair("client_assertion_type", CLIENT_ASSERTION_TYPE)
		.append_pair("client_assertion", assertion)
		.append_pair("scope", &scopes.normalized())
		.finish()
}
