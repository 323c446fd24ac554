//! Service request descriptions accepted by [`ServiceConnector::make_service_request`].
//!
//! [`ServiceConnector::make_service_request`]: crate::connector::ServiceConnector::make_service_request

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::ConfigError,
};

/// Media type used for `Content-Type` and `Accept` unless overridden.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// HTTP methods supported by platform service calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ServiceMethod {
	/// Read a resource.
	#[default]
	Get,
	/// Submit a body (scores, line items).
	Post,
}
impl ServiceMethod {
	/// Returns the method token as sent on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			ServiceMethod::Get => "GET",
			ServiceMethod::Post => "POST",
		}
	}

	fn as_http(self) -> Method {
		match self {
			ServiceMethod::Get => Method::GET,
			ServiceMethod::Post => Method::POST,
		}
	}
}
impl Display for ServiceMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One authenticated call to a platform service endpoint.
#[derive(Clone, Debug)]
pub struct ServiceRequest {
	/// Scopes the access token must carry.
	pub scopes: ScopeSet,
	/// HTTP method.
	pub method: ServiceMethod,
	/// Endpoint URL.
	pub url: Url,
	/// Raw body sent verbatim with POST requests; ignored for GET.
	pub body: Option<String>,
	/// `Content-Type` sent with POST requests.
	pub content_type: String,
	/// `Accept` sent with every request.
	pub accept: String,
}
impl ServiceRequest {
	/// Creates a request with JSON content type and accept headers.
	pub fn new(scopes: ScopeSet, method: ServiceMethod, url: Url) -> Self {
		Self {
			scopes,
			method,
			url,
			body: None,
			content_type: DEFAULT_MEDIA_TYPE.into(),
			accept: DEFAULT_MEDIA_TYPE.into(),
		}
	}

	/// Shorthand for a GET request.
	pub fn get(scopes: ScopeSet, url: Url) -> Self {
		Self::new(scopes, ServiceMethod::Get, url)
	}

	/// Shorthand for a POST request carrying `body`.
	pub fn post(scopes: ScopeSet, url: Url, body: impl Into<String>) -> Self {
		Self::new(scopes, ServiceMethod::Post, url).with_body(body)
	}

	/// Sets the raw body. The caller is responsible for encoding it to match the content type.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Overrides the `Content-Type` header (defaults to `application/json`).
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = content_type.into();

		self
	}

	/// Overrides the `Accept` header (defaults to `application/json`).
	pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
		self.accept = accept.into();

		self
	}

	/// Builds the wire request authorized by `token`.
	pub(crate) fn to_http_request(&self, token: &AccessToken) -> Result<HttpRequest, ConfigError> {
		let builder = Request::builder()
			.method(self.method.as_http())
			.uri(self.url.as_str())
			.header(AUTHORIZATION, token.bearer_header())
			.header(ACCEPT, self.accept.as_str());
		let request = match self.method {
			ServiceMethod::Get => builder.body(Vec::new())?,
			ServiceMethod::Post => builder
				.header(CONTENT_TYPE, self.content_type.as_str())
				.body(self.body.clone().unwrap_or_default().into_bytes())?,
		};

		Ok(request)
	}
}
