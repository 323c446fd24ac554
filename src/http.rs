//! Transport primitives shared by token exchanges and service requests.
//!
//! [`ServiceHttpClient`] is the connector's only dependency on an HTTP stack. Each call asks
//! the transport for a short-lived [`AsyncHttpClient`] handle configured with the timeout of
//! that call (10 seconds for token exchanges, 60 seconds for service requests), so fake
//! transports can be injected in tests without touching the network.

// crates.io
use oauth2::AsyncHttpClient;
#[cfg(feature = "reqwest")] use oauth2::{HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports able to execute token exchanges and service requests.
///
/// Implementations must be `Send + Sync + 'static` so connectors can share them behind
/// `Arc`, and the futures produced by their handles must be `Send`.
pub trait ServiceHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle bound to one timeout.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = oauth2::HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle whose requests give up after `timeout`. Handles follow redirects.
	fn with_timeout(&self, timeout: StdDuration) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default reqwest client follows up to ten redirects, which service requests rely on.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl ServiceHttpClient for ReqwestHttpClient {
	type Handle = TimedHandle;
	type TransportError = ReqwestError;

	fn with_timeout(&self, timeout: StdDuration) -> Self::Handle {
		TimedHandle { client: self.0.clone(), timeout }
	}
}

/// Handle returned by [`ReqwestHttpClient`] that applies a per-request timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct TimedHandle {
	client: ReqwestClient,
	timeout: StdDuration,
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for TimedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.client.clone();
		let timeout = self.timeout;

		Box::pin(async move {
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			*request.timeout_mut() = Some(timeout);

			let response = client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.version_mut() = version;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
