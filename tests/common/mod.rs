//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
// self
use stride_refapp::{api::StrideClient, http::ReqwestHttpClient, reqwest::Client, url::Url};

pub use stride_refapp::error::Error;
pub use time::{Duration, OffsetDateTime};

/// Client identifier used by test fixtures.
pub const TEST_CLIENT_ID: &str = "refapp-client";
/// Client secret used by test fixtures; also signs inbound test tokens.
pub const TEST_CLIENT_SECRET: &str = "refapp-secret";

/// Builds a reqwest HTTP client that tolerates the self-signed certificates of local mock servers.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Constructs a [`StrideClient`] whose API and token endpoints live under `base_url`.
pub fn build_test_client(base_url: &str) -> StrideClient {
	let base_url = Url::parse(base_url).expect("Mock server base URL should parse.");

	StrideClient::with_http_client(
		base_url,
		TEST_CLIENT_ID,
		TEST_CLIENT_SECRET,
		test_reqwest_http_client(),
	)
	.expect("Test Stride client should build successfully.")
}

/// Signs arbitrary `claims` with `secret` using `algorithm`.
pub fn sign_inbound_claims(secret: &str, algorithm: Algorithm, claims: &Value) -> String {
	jsonwebtoken::encode(&Header::new(algorithm), claims, &EncodingKey::from_secret(secret.as_bytes()))
		.expect("Inbound test token should encode.")
}

/// Claims the platform puts into webhook tokens, expiring `expires_in` from now.
pub fn inbound_claims(
	cloud_id: &str,
	conversation_id: &str,
	user_id: &str,
	expires_in: Duration,
) -> Value {
	let now = OffsetDateTime::now_utc();

	json!({
		"iss": "stride",
		"sub": user_id,
		"aud": TEST_CLIENT_ID,
		"iat": now.unix_timestamp(),
		"exp": (now + expires_in).unix_timestamp(),
		"context": { "cloudId": cloud_id, "resourceId": conversation_id },
	})
}

/// Signs an inbound token the way the platform does for webhook calls.
pub fn mint_inbound_token(
	secret: &str,
	cloud_id: &str,
	conversation_id: &str,
	user_id: &str,
	expires_in: Duration,
) -> String {
	sign_inbound_claims(
		secret,
		Algorithm::HS256,
		&inbound_claims(cloud_id, conversation_id, user_id, expires_in),
	)
}
