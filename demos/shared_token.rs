//! Demonstrates the REST client sharing one cached access token across concurrent calls,
//! against a mock of the Stride API.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use stride_refapp::{api::StrideClient, http::ReqwestHttpClient};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/scim/site/demo-site/Users/demo-user")
				.header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"demo-user\",\"displayName\":\"Demo User\"}");
		})
		.await;
	let client = StrideClient::with_http_client(
		Url::parse(&server.base_url())?,
		"demo-client",
		"super-secret",
		ReqwestHttpClient::default(),
	)?;
	let (first, second, third) = tokio::join!(
		client.get_user("demo-site", "demo-user"),
		client.get_user("demo-site", "demo-user"),
		client.get_user("demo-site", "demo-user"),
	);

	println!("users: {}, {}, {}", first?.display_name, second?.display_name, third?.display_name);

	token_mock.assert_calls_async(1).await;
	user_mock.assert_calls_async(3).await;

	println!("three calls, one token request");

	Ok(())
}
