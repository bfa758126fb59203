mod common;

// crates.io
use httpmock::{Mock, prelude::*};
// self
use common::*;
use stride_refapp::error::ConfigError;

const TOKEN_BODY: &str =
	"{\"access_token\":\"shared-token\",\"token_type\":\"bearer\",\"expires_in\":3600}";

async fn mock_token_endpoint<'a>(
	server: &'a MockServer,
	status: u16,
	body: &'static str,
) -> Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn concurrent_callers_share_one_fetch() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let mock = mock_token_endpoint(&server, 200, TOKEN_BODY).await;
	let (first, second, third) =
		tokio::join!(client.access_token(), client.access_token(), client.access_token());

	for token in [first, second, third] {
		assert_eq!(token.expect("Every caller should get the token.").expose(), "shared-token");
	}

	mock.assert_calls_async(1).await;
	assert!(!client.tokens().is_fetching());
}

#[tokio::test]
async fn cached_token_is_reused_until_the_refresh_margin() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let mock = mock_token_endpoint(&server, 200, TOKEN_BODY).await;

	client.access_token().await.expect("First call should fetch a token.");
	client.access_token().await.expect("Second call should reuse the token.");

	mock.assert_calls_async(1).await;

	let cached = client.tokens().peek().expect("A token should be cached.");
	let lifetime = cached.expires_at - OffsetDateTime::now_utc();

	assert!(lifetime > Duration::seconds(3_500));
	assert!(lifetime <= Duration::seconds(3_540));
}

#[tokio::test]
async fn short_lived_token_is_fetched_again() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let mock = mock_token_endpoint(
		&server,
		200,
		"{\"access_token\":\"brief-token\",\"token_type\":\"bearer\",\"expires_in\":30}",
	)
	.await;

	client.access_token().await.expect("First call should fetch a token.");
	client.access_token().await.expect("Second call should fetch again.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn failure_reaches_every_waiter_and_the_next_call_retries() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let failing = mock_token_endpoint(&server, 500, "{\"error\":\"server_error\"}").await;
	let (first, second) = tokio::join!(client.access_token(), client.access_token());

	assert!(matches!(first, Err(Error::TokenFetch(_))));
	assert!(matches!(second, Err(Error::TokenFetch(_))));
	assert!(!client.tokens().is_fetching());
	assert!(client.tokens().peek().is_none());

	failing.assert_calls_async(1).await;
	failing.delete_async().await;

	let recovered = mock_token_endpoint(&server, 200, TOKEN_BODY).await;
	let token = client.access_token().await.expect("Retry after a failure should succeed.");

	assert_eq!(token.expose(), "shared-token");

	recovered.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_credentials_are_reported() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let _mock = mock_token_endpoint(&server, 401, "{\"error\":\"invalid_client\"}").await;
	let err = client.access_token().await.expect_err("Rejected credentials should fail.");
	let Error::TokenFetch(inner) = &err else { panic!("Expected a token fetch failure, got {err:?}.") };

	assert!(matches!(inner.as_ref(), Error::InvalidClient { .. }));
}

#[tokio::test]
async fn token_without_lifetime_is_refused() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.base_url());
	let _mock = mock_token_endpoint(
		&server,
		200,
		"{\"access_token\":\"timeless\",\"token_type\":\"bearer\"}",
	)
	.await;
	let err = client.access_token().await.expect_err("A token without expires_in is unusable.");
	let Error::TokenFetch(inner) = &err else { panic!("Expected a token fetch failure, got {err:?}.") };

	assert!(matches!(inner.as_ref(), Error::Config(ConfigError::MissingExpiresIn)));
}
