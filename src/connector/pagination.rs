//! Page walking along `Link: <..>; rel="next"` headers.

// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	connector::{ServiceConnector, ServiceRequest},
	http::ServiceHttpClient,
	response::ServiceResponse,
};

impl<C> ServiceConnector<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// GETs `url` and every page reachable through `next` links, returning the pages in order.
	///
	/// Relative links resolve against the page that advertised them. The walk stops at the
	/// first page without a `next` link, at a link that cannot be resolved, or at a link that
	/// points back to a page already fetched. Any error aborts the walk.
	pub async fn fetch_all_pages(
		&self,
		scopes: &ScopeSet,
		url: Url,
		accept: &str,
	) -> Result<Vec<ServiceResponse>> {
		let mut pages = Vec::new();
		let mut visited = HashSet::new();
		let mut next = Some(url);

		while let Some(current) = next.take() {
			if !visited.insert(current.clone()) {
				#[cfg(feature = "tracing")]
				tracing::warn!(url = %current, "Pagination loop detected; stopping.");

				break;
			}

			let response = self
				.make_service_request(
					ServiceRequest::get(scopes.clone(), current.clone()).with_accept(accept),
				)
				.await?;

			next = response.next_page_url().and_then(|link| current.join(&link).ok());

			pages.push(response);
		}

		Ok(pages)
	}
}
