//! Reqwest transport shared by the token fetch and the Stride REST calls.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Thin wrapper around [`ReqwestClient`] used for both the token endpoint and the REST API.
///
/// The token endpoint answers directly; a custom client passed to
/// [`ReqwestHttpClient::with_client`] should not be configured to follow redirects.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}
impl<'c> AsyncHttpClient<'c> for ReqwestHttpClient {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut converted =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use oauth2::http::{Method, Request, StatusCode};
	// self
	use super::*;

	#[tokio::test]
	async fn token_requests_keep_the_upstream_status_and_body() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST).path("/oauth/token").body_includes("grant_type=client_credentials");
				then.status(400).header("content-type", "application/json").body("{\"error\":\"invalid_scope\"}");
			})
			.await;
		let request = Request::builder()
			.method(Method::POST)
			.uri(server.url("/oauth/token"))
			.body(b"grant_type=client_credentials".to_vec())
			.expect("Request should build.");
		let response = ReqwestHttpClient::default()
			.call(request)
			.await
			.expect("Transport should return the error response.");

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(response.body().as_slice(), b"{\"error\":\"invalid_scope\"}");
		assert_eq!(response.headers()["content-type"], "application/json");

		mock.assert_calls_async(1).await;
	}
}
