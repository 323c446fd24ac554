//! Connector-level error types shared across token acquisition, service requests, and caches.

// self
use crate::_prelude::*;

/// Connector-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical connector error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Cache-layer failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The authorization server rejected the exchange or could not be reached.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// The platform service endpoint could not be reached.
	#[error(transparent)]
	ServiceRequest(#[from] ServiceRequestError),
}

/// Configuration and validation failures raised before any network traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Registration is missing a field or carries an invalid value.
	#[error(transparent)]
	InvalidRegistration(#[from] crate::registration::RegistrationError),
	/// Request scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Tool private key is not a usable RSA PEM key.
	#[error("Tool private key is not a valid RSA PEM key.")]
	InvalidPrivateKey {
		/// Underlying key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The client assertion could not be signed.
	#[error("Client assertion could not be signed.")]
	AssertionSigning {
		/// Underlying signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures while exchanging a client assertion for an access token.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Authorization server answered with a non-success status.
	#[error("Token endpoint rejected the request with HTTP {status}.")]
	Rejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Underlying HTTP client failed before a response arrived.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint responded with JSON that lacks a usable `access_token`.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl TokenExchangeError {
	/// Wraps a transport-specific failure.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Failures while calling a platform service endpoint.
///
/// HTTP error statuses are not represented here; they are returned as ordinary
/// [`ServiceResponse`](crate::response::ServiceResponse) values.
#[derive(Debug, ThisError)]
pub enum ServiceRequestError {
	/// Connection, DNS, TLS, or timeout failure.
	#[error("Network error occurred while calling the service endpoint {url}.")]
	Transport {
		/// Endpoint that was being called.
		url: String,
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}
impl ServiceRequestError {
	/// Wraps a transport-specific failure for the provided endpoint.
	pub fn transport(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { url: url.to_string(), source: Box::new(src) }
	}
}
