//! Client-credentials exchange against the Stride token endpoint, built on the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicErrorResponseType, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::ReqwestHttpClient,
	token::{IssuedToken, TokenFuture, TokenSource},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// [`TokenSource`] that runs the client-credentials grant with the app's id and secret sent in
/// the request body.
pub struct ClientCredentials {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl ClientCredentials {
	/// Configures the exchange against `token_endpoint`.
	pub fn new(
		token_endpoint: &Url,
		client_id: &str,
		client_secret: &str,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let token_url = TokenUrl::new(token_endpoint.to_string())
			.map_err(|source| ConfigError::invalid_url(token_endpoint.as_str(), source))?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client })
	}

	async fn exchange(&self) -> Result<IssuedToken> {
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&self.http_client)
			.await
			.map_err(map_request_error)?;
		let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
		let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		Ok(IssuedToken::new(response.access_token().secret().to_owned(), Duration::seconds(expires_in)))
	}
}
impl TokenSource for ClientCredentials {
	fn fetch(&self) -> TokenFuture<'_> {
		Box::pin(self.exchange())
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.oauth_client.client_id().as_str())
			.finish()
	}
}

fn map_request_error(err: BasicRequestTokenError<HttpClientError<ReqwestError>>) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response),
		RequestTokenError::Request(HttpClientError::Reqwest(inner)) =>
			TransportError::from(*inner).into(),
		RequestTokenError::Request(HttpClientError::Http(inner)) => ConfigError::from(inner).into(),
		RequestTokenError::Request(HttpClientError::Io(inner)) => TransportError::Io(inner).into(),
		RequestTokenError::Request(other) =>
			Error::TokenEndpoint { message: format!("HTTP client error: {other}") },
		RequestTokenError::Parse(source, _body) =>
			Error::TokenEndpoint { message: format!("malformed token response: {source}") },
		RequestTokenError::Other(message) => Error::TokenEndpoint { message },
	}
}

fn map_server_response_error(response: BasicErrorResponse) -> Error {
	let message = match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	match response.error() {
		BasicErrorResponseType::InvalidClient | BasicErrorResponseType::UnauthorizedClient =>
			Error::InvalidClient { reason: message },
		_ => Error::TokenEndpoint { message },
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::StandardErrorResponse;
	// self
	use super::*;

	fn error_response(kind: BasicErrorResponseType) -> BasicErrorResponse {
		StandardErrorResponse::new(kind, Some("nope".into()), None)
	}

	#[test]
	fn builds_against_any_token_endpoint() {
		let endpoint =
			Url::parse("https://api.stg.atlassian.com/oauth/token").expect("Endpoint should parse.");
		let source =
			ClientCredentials::new(&endpoint, "client-id", "secret", ReqwestHttpClient::default())
				.expect("Client credentials source should build.");

		assert!(format!("{source:?}").contains("client-id"));
		assert!(!format!("{source:?}").contains("secret"));
	}

	#[test]
	fn invalid_client_is_classified_as_rejected_credentials() {
		let err = map_server_response_error(error_response(BasicErrorResponseType::InvalidClient));

		assert!(matches!(err, Error::InvalidClient { ref reason } if reason == "invalid_client: nope"));
	}

	#[test]
	fn other_oauth_errors_surface_as_token_endpoint_failures() {
		let err = map_server_response_error(error_response(BasicErrorResponseType::InvalidGrant));

		assert!(matches!(err, Error::TokenEndpoint { ref message } if message == "invalid_grant: nope"));
	}

	#[test]
	fn unexpected_responses_keep_their_message() {
		let err = map_request_error(RequestTokenError::Other("empty body".into()));

		assert_eq!(err.to_string(), "Token endpoint returned an unexpected response: empty body.");
	}
}
