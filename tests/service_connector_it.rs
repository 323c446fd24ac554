// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use lti_service_connector::{
	_preludet::*,
	auth::ScopeSet,
	cache::AccessTokenCache,
	connector::ServiceRequest,
	error::{Error, ServiceRequestError, TokenExchangeError},
};

const CLIENT_ID: &str = "tool-client";

fn scopes(values: &[&str]) -> ScopeSet {
	ScopeSet::new(values.iter().copied()).expect("Scope fixture should be valid.")
}

async fn mock_token_endpoint<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"tok123\"}");
		})
		.await
}

#[tokio::test]
async fn token_is_exchanged_once_per_scope_set() {
	let server = MockServer::start_async().await;
	let (connector, cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let mock = mock_token_endpoint(&server).await;
	let first = connector
		.fetch_access_token(&scopes(&["a", "b"]))
		.await
		.expect("Initial token exchange should succeed.");
	let second = connector
		.fetch_access_token(&scopes(&["b", "a"]))
		.await
		.expect("Reordered scopes should be served from the cache.");

	assert_eq!(first.expose(), "tok123");
	assert_eq!(second.expose(), "tok123");

	mock.assert_calls_async(1).await;

	let stored = cache
		.fetch_access_token(&connector.cache_key(&scopes(&["a", "b"])))
		.await
		.expect("Cache read should succeed.")
		.expect("Exchanged token should be cached.");

	assert_eq!(stored.expose(), "tok123");
	assert!(connector.cache_key(&scopes(&["a", "b"])).as_str().ends_with("-tool-client"));
}

#[tokio::test]
async fn rejected_exchange_surfaces_status_and_body() {
	let server = MockServer::start_async().await;
	let (connector, cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let err = connector
		.fetch_access_token(&scopes(&["score"]))
		.await
		.expect_err("A 401 from the token endpoint must fail.");

	mock.assert_async().await;

	match err {
		Error::TokenExchange(TokenExchangeError::Rejected { status, body }) => {
			assert_eq!(status, 401);
			assert!(body.contains("invalid_client"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(cache.is_empty(), "Failed exchanges must not be cached.");
}

#[tokio::test]
async fn token_response_without_access_token_is_malformed() {
	let server = MockServer::start_async().await;
	let (connector, cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token_type\":\"bearer\"}");
		})
		.await;
	let err = connector
		.fetch_access_token(&scopes(&["score"]))
		.await
		.expect_err("A token response without access_token must fail.");

	mock.assert_async().await;

	assert!(
		matches!(err, Error::TokenExchange(TokenExchangeError::MalformedResponse { status: 200, .. })),
		"{err:?}"
	);
	assert!(cache.is_empty());
}

#[tokio::test]
async fn error_statuses_pass_through_as_responses() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let token = mock_token_endpoint(&server).await;
	let lineitems = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/lineitems")
				.header("authorization", "Bearer tok123")
				.header("accept", "application/vnd.ims.lis.v2.lineitemcontainer+json");
			then.status(404)
				.header("content-type", "application/json")
				.body("{\"error\":\"not found\"}");
		})
		.await;
	let url = Url::parse(&server.url("/lineitems")).expect("Mock URL should parse.");
	let request = ServiceRequest::get(scopes(&["lineitem.readonly"]), url)
		.with_accept("application/vnd.ims.lis.v2.lineitemcontainer+json");
	let response =
		connector.make_service_request(request).await.expect("A 404 is still a response.");

	token.assert_async().await;
	lineitems.assert_async().await;

	assert_eq!(response.status, 404);
	assert!(!response.is_success());
	assert_eq!(response.body, Some(json!({ "error": "not found" })));
	assert!(response.headers.lines()[0].contains("404"));
	assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn post_sends_body_with_bearer_and_content_type() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let token = mock_token_endpoint(&server).await;
	let scores = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/lineitems/1/scores")
				.header("authorization", "Bearer tok123")
				.header("content-type", "application/vnd.ims.lis.v1.score+json")
				.body("{\"scoreGiven\":7}");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let url = Url::parse(&server.url("/lineitems/1/scores")).expect("Mock URL should parse.");
	let request = ServiceRequest::post(scopes(&["score"]), url, "{\"scoreGiven\":7}")
		.with_content_type("application/vnd.ims.lis.v1.score+json");
	let response = connector.make_service_request(request).await.expect("Score post should succeed.");

	token.assert_async().await;
	scores.assert_async().await;

	assert!(response.is_success());
	assert_eq!(response.body, Some(json!({ "ok": true })));
}

#[tokio::test]
async fn non_json_bodies_are_returned_without_a_parsed_body() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let _token = mock_token_endpoint(&server).await;
	let page = server
		.mock_async(|when, then| {
			when.method(GET).path("/html");
			then.status(200).header("content-type", "text/html").body("<html></html>");
		})
		.await;
	let url = Url::parse(&server.url("/html")).expect("Mock URL should parse.");
	let response = connector
		.make_service_request(ServiceRequest::get(scopes(&["score"]), url))
		.await
		.expect("Non-JSON bodies should not fail the request.");

	page.assert_async().await;

	assert_eq!(response.status, 200);
	assert_eq!(response.body, None);
}

#[tokio::test]
async fn unreachable_service_is_a_service_request_error() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let _token = mock_token_endpoint(&server).await;
	let url = Url::parse("http://127.0.0.1:1/members").expect("Unreachable URL should parse.");
	let err = connector
		.make_service_request(ServiceRequest::get(scopes(&["nrps"]), url))
		.await
		.expect_err("Connection failures must surface as errors.");

	assert!(
		matches!(err, Error::ServiceRequest(ServiceRequestError::Transport { .. })),
		"{err:?}"
	);
}

#[tokio::test]
async fn page_walk_follows_link_headers() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let token = mock_token_endpoint(&server).await;
	let next = format!("<{}>; rel=\"next\"", server.url("/members/page2"));
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path("/members");
			then.status(200)
				.header("content-type", "application/json")
				.header("link", next.as_str())
				.body("{\"members\":[\"ada\"]}");
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path("/members/page2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"members\":[\"grace\"]}");
		})
		.await;
	let url = Url::parse(&server.url("/members")).expect("Mock URL should parse.");
	let pages = connector
		.fetch_all_pages(&scopes(&["nrps"]), url, "application/json")
		.await
		.expect("Page walk should succeed.");

	token.assert_calls_async(1).await;
	first.assert_async().await;
	second.assert_async().await;

	assert_eq!(pages.len(), 2);
	assert!(pages[0].next_page_url().is_some());
	assert_eq!(pages[1].next_page_url(), None);
	assert_eq!(pages[1].body, Some(json!({ "members": ["grace"] })));
}

#[tokio::test]
async fn service_requests_follow_redirects() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let token = mock_token_endpoint(&server).await;
	let location = server.url("/final");
	let moved = server
		.mock_async(|when, then| {
			when.method(GET).path("/members");
			then.status(302).header("location", location.as_str());
		})
		.await;
	let landing = server
		.mock_async(|when, then| {
			when.method(GET).path("/final").header("authorization", "Bearer tok123");
			then.status(200)
				.header("content-type", "application/json")
				.header("link", "<https://x/y?page=2>; rel=\"next\"")
				.body("{\"ok\":1}");
		})
		.await;
	let url = Url::parse(&server.url("/members")).expect("Mock URL should parse.");
	let response = connector
		.make_service_request(ServiceRequest::get(scopes(&["nrps"]), url))
		.await
		.expect("Redirected request should succeed.");

	token.assert_async().await;
	moved.assert_async().await;
	landing.assert_async().await;

	assert_eq!(response.status, 200);
	assert_eq!(response.body, Some(json!({ "ok": 1 })));
	assert_eq!(response.next_page_url(), Some("https://x/y?page=2".into()));
}

#[tokio::test]
async fn slow_service_hits_the_service_timeout() {
	let server = MockServer::start_async().await;
	let (connector, _cache) = build_reqwest_test_connector(CLIENT_ID, &server.url("/token"));
	let connector = connector.with_service_timeout(StdDuration::from_millis(200));
	let token = mock_token_endpoint(&server).await;
	let _slow = server
		.mock_async(|when, then| {
			when.method(GET).path("/slow");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_secs(3))
				.body("{}");
		})
		.await;
	let url = Url::parse(&server.url("/slow")).expect("Mock URL should parse.");
	let err = connector
		.make_service_request(ServiceRequest::get(scopes(&["nrps"]), url))
		.await
		.expect_err("A response slower than the service timeout must fail.");

	token.assert_async().await;

	match err {
		Error::ServiceRequest(ServiceRequestError::Transport { url, .. }) =>
			assert!(url.ends_with("/slow"), "{url}"),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
