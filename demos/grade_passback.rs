//! Demonstrates posting a score to a platform's Assignment and Grade Services endpoint with the
//! default reqwest transport, then re-using the cached token to page through the roster.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use lti_service_connector::{
	auth::ScopeSet,
	cache::{AccessTokenCache, MemoryCache},
	connector::{ServiceConnector, ServiceRequest},
	registration::{Registration, ToolRegistration},
};

const SCORE_SCOPE: &str = "https://purl.imsglobal.org/spec/lti-ags/scope/score";
const NRPS_SCOPE: &str = "https://purl.imsglobal.org/spec/lti-nrps/scope/contextmembership.readonly";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let score_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/lineitems/1/scores").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let next = format!("<{}>; rel=\"next\"", server.url("/memberships/2"));
	let _first_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/memberships");
			then.status(200)
				.header("content-type", "application/json")
				.header("link", next.as_str())
				.body("{\"members\":[{\"user_id\":\"ada\"}]}");
		})
		.await;
	let _second_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/memberships/2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"members\":[{\"user_id\":\"grace\"}]}");
		})
		.await;
	let registration: Arc<dyn Registration> = Arc::new(
		ToolRegistration::builder()
			.client_id("demo-tool")
			.auth_server(server.base_url())
			.auth_token_url(Url::parse(&server.url("/token"))?)
			.tool_private_key(include_str!("../tests/fixtures/tool_private_key.pem"))
			.kid("demo-key")
			.build()?,
	);
	let cache: Arc<dyn AccessTokenCache> = Arc::new(MemoryCache::default());
	let connector = ServiceConnector::new(registration, cache);
	let scopes = ScopeSet::new([SCORE_SCOPE, NRPS_SCOPE])?;
	let score = ServiceRequest::post(
		scopes.clone(),
		Url::parse(&server.url("/lineitems/1/scores"))?,
		"{\"userId\":\"ada\",\"scoreGiven\":9,\"scoreMaximum\":10,\"activityProgress\":\"Completed\",\"gradingProgress\":\"FullyGraded\"}",
	)
	.with_content_type("application/vnd.ims.lis.v1.score+json");
	let response = connector.make_service_request(score).await?;

	println!("Score endpoint answered with status {}.", response.status);

	let pages = connector
		.fetch_all_pages(
			&scopes,
			Url::parse(&server.url("/memberships"))?,
			"application/vnd.ims.lti-nrps.v2.membershipcontainer+json",
		)
		.await?;

	for (index, page) in pages.iter().enumerate() {
		println!("Roster page {}: {}.", index + 1, page.body.clone().unwrap_or_default());
	}

	token_mock.assert_calls_async(1).await;
	score_mock.assert_async().await;

	Ok(())
}
