//! Authenticated platform service calls.
//!
//! HTTP error statuses are returned as ordinary [`ServiceResponse`] values so callers can read
//! the platform's error document; only transport failures become errors.

// crates.io
use oauth2::AsyncHttpClient;
// self
use crate::{
	_prelude::*,
	connector::{ServiceConnector, ServiceRequest},
	error::ServiceRequestError,
	http::ServiceHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	response::ServiceResponse,
};

impl<C> ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Obtains a token for the request's scopes, performs the call, and returns the response
	/// headers and best-effort JSON body.
	pub async fn make_service_request(&self, request: ServiceRequest) -> Result<ServiceResponse> {
		const KIND: OperationKind = OperationKind::ServiceRequest;

		let span = OperationSpan::new(KIND, "make_service_request");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.fetch_access_token(&request.scopes).await?;
				let http_request = request.to_http_request(&token).map_err(Error::from)?;
				let handle = self.http_client.with_timeout(self.service_timeout);
				let response = handle
					.call(http_request)
					.await
					.map_err(|e| ServiceRequestError::transport(&request.url, e))?;

				#[cfg(feature = "tracing")]
				tracing::debug!(
					method = request.method.as_str(),
					url = %request.url,
					status = response.status().as_u16(),
					"Service endpoint responded."
				);

				Ok(ServiceResponse::from_http(response))
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}
}
