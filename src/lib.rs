//! LTI 1.3 / LTI Advantage service connector: signed-JWT client-credentials tokens with
//! cache-aware reuse, plus authenticated platform service calls with `Link`-header pagination.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod connector;
pub mod error;
pub mod http;
pub mod obs;
pub mod registration;
pub mod response;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		cache::{AccessTokenCache, MemoryCache},
		connector::ServiceConnector,
		http::ReqwestHttpClient,
		registration::{Registration, ToolRegistration},
	};

	/// PKCS#8 RSA private key used to sign assertions in tests.
	pub const TEST_TOOL_PRIVATE_KEY: &str = include_str!("../tests/fixtures/tool_private_key.pem");
	/// Public half of [`TEST_TOOL_PRIVATE_KEY`], used to verify signed assertions.
	pub const TEST_TOOL_PUBLIC_KEY: &str = include_str!("../tests/fixtures/tool_public_key.pem");
	/// Key identifier advertised in the assertion header during tests.
	pub const TEST_KID: &str = "tool-key-1";
	/// Audience (`aud`) used for the test registration.
	pub const TEST_AUTH_SERVER: &str = "https://platform.example.com";

	/// Connector type alias used by reqwest-backed integration tests.
	pub type ReqwestTestConnector = ServiceConnector<ReqwestHttpClient>;

	/// Builds a registration pointing at the provided token endpoint and signed with the fixture
	/// key.
	pub fn test_registration(client_id: &str, token_url: &str) -> ToolRegistration {
		ToolRegistration::builder()
			.client_id(client_id)
			.auth_server(TEST_AUTH_SERVER)
			.auth_token_url(
				Url::parse(token_url).expect("Failed to parse test token endpoint URL."),
			)
			.tool_private_key(TEST_TOOL_PRIVATE_KEY)
			.kid(TEST_KID)
			.build()
			.expect("Failed to build test registration.")
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`ServiceConnector`] backed by an in-memory cache, the fixture registration,
	/// and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_connector(
		client_id: &str,
		token_url: &str,
	) -> (ReqwestTestConnector, Arc<MemoryCache>) {
		let cache_backend = Arc::new(MemoryCache::default());
		let cache: Arc<dyn AccessTokenCache> = cache_backend.clone();
		let registration: Arc<dyn Registration> =
			Arc::new(test_registration(client_id, token_url));
		let connector =
			ServiceConnector::with_http_client(registration, cache, test_reqwest_http_client());

		(connector, cache_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))]
use {color_eyre as _, httpmock as _, lti_service_connector as _};
