//! Inbound token gate: every platform call that reaches a gated route carries a token signed
//! with the app's client secret. The gate verifies it and attaches the call's [`RequestContext`]
//! to the request, or answers `403 Forbidden` without running the handler.

// crates.io
use axum::{
	extract::{FromRequestParts, Request, State},
	http::{HeaderMap, StatusCode, Uri, header::AUTHORIZATION, request::Parts},
	middleware::Next,
	response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	obs::{self, Op, OpOutcome, OpSpan},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Reasons an inbound call is refused.
#[derive(Debug, ThisError)]
pub enum GateError {
	/// Neither the `jwt` query parameter nor the `Authorization` header carried a token.
	#[error("Expected encoded JWT not found.")]
	MissingToken,
	/// The token could not be decoded at all.
	#[error("Inbound token is malformed.")]
	Malformed {
		/// Decoder failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Signature, expiry, or claim shape check failed.
	#[error("Inbound token failed verification.")]
	Rejected {
		/// Verification failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}

/// Call context carried by a verified inbound token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
	/// Site id (`context.cloudId`).
	pub tenant_id: String,
	/// Conversation id (`context.resourceId`).
	pub conversation_id: String,
	/// Calling user (`sub`).
	pub caller_id: String,
}
impl From<InboundClaims> for RequestContext {
	fn from(claims: InboundClaims) -> Self {
		Self {
			tenant_id: claims.context.cloud_id,
			conversation_id: claims.context.resource_id,
			caller_id: claims.sub,
		}
	}
}
impl<S> FromRequestParts<S> for RequestContext
where
	S: Send + Sync,
{
	type Rejection = StatusCode;

	async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<Self>().cloned().ok_or(StatusCode::FORBIDDEN)
	}
}

/// Claims the platform puts in inbound tokens. `sub` and both context ids are required.
#[derive(Clone, Debug, Deserialize)]
pub struct InboundClaims {
	/// Calling user.
	pub sub: String,
	/// Conversation scope of the call.
	pub context: ClaimsContext,
	/// Issuer.
	#[serde(default)]
	pub iss: Option<String>,
	/// Audience, a string or a list.
	#[serde(default)]
	pub aud: Option<Value>,
	/// Expiry as a Unix timestamp.
	#[serde(default)]
	pub exp: Option<i64>,
	/// Issue time as a Unix timestamp.
	#[serde(default)]
	pub iat: Option<i64>,
}

/// `context` claim.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsContext {
	/// Site id.
	pub cloud_id: String,
	/// Conversation id.
	pub resource_id: String,
}

/// HMAC verifier keyed with the app's client secret.
///
/// Accepts HS256, HS384, and HS512 signatures. `exp` and `nbf` are enforced with no leeway.
#[derive(Clone)]
pub struct TokenGate {
	key: Arc<DecodingKey>,
	verify: Arc<Validation>,
	inspect: Arc<Validation>,
}
impl TokenGate {
	/// Creates a gate that accepts tokens signed with `client_secret`.
	pub fn new(client_secret: &str) -> Self {
		let mut verify = Validation::new(Algorithm::HS256);

		verify.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
		verify.required_spec_claims.clear();
		verify.validate_aud = false;
		verify.validate_nbf = true;
		verify.leeway = 0;

		let mut inspect = verify.clone();

		inspect.insecure_disable_signature_validation();
		inspect.validate_exp = false;
		inspect.validate_nbf = false;

		Self {
			key: Arc::new(DecodingKey::from_secret(client_secret.as_bytes())),
			verify: Arc::new(verify),
			inspect: Arc::new(inspect),
		}
	}

	/// Extracts and verifies the token carried by a request.
	pub fn authorize(&self, uri: &Uri, headers: &HeaderMap) -> Result<RequestContext, GateError> {
		let raw = extract_token(uri, headers).ok_or(GateError::MissingToken)?;

		self.verify(&raw)
	}

	/// Verifies `raw` and returns the context it carries.
	pub fn verify(&self, raw: &str) -> Result<RequestContext, GateError> {
		const OP: Op = Op::VerifyInbound;

		let _span = OpSpan::new(OP, "verify").entered();

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = self.verify_inner(raw);

		obs::record_op_outcome(
			OP,
			if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure },
		);

		result
	}

	fn verify_inner(&self, raw: &str) -> Result<RequestContext, GateError> {
		let unverified = jsonwebtoken::decode::<Value>(raw, &self.key, &self.inspect)
			.map_err(|source| GateError::Malformed { source })?;
		let iss = unverified.claims.get("iss").and_then(Value::as_str);
		let sub = unverified.claims.get("sub").and_then(Value::as_str);

		tracing::debug!(iss, sub, "got inbound token");

		let claims = jsonwebtoken::decode::<InboundClaims>(raw, &self.key, &self.verify)
			.map_err(|source| GateError::Rejected { source })?
			.claims;
		let context = RequestContext::from(claims);

		tracing::info!(
			tenant_id = %context.tenant_id,
			conversation_id = %context.conversation_id,
			caller_id = %context.caller_id,
			"inbound token valid"
		);

		Ok(context)
	}
}
impl Debug for TokenGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenGate(..)")
	}
}

/// Finds the raw inbound token.
///
/// A non-empty `jwt` query parameter wins. Otherwise the `Authorization` header is used, with a
/// leading `Bearer ` stripped; a header without that prefix is taken verbatim.
pub fn extract_token(uri: &Uri, headers: &HeaderMap) -> Option<String> {
	let from_query = uri.query().and_then(|query| {
		url::form_urlencoded::parse(query.as_bytes())
			.find(|(name, value)| name == "jwt" && !value.is_empty())
			.map(|(_, value)| value.into_owned())
	});

	if from_query.is_some() {
		return from_query;
	}

	let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();

	(!token.is_empty()).then(|| token.to_owned())
}

/// Middleware guarding a route with a [`TokenGate`].
pub async fn require_context(
	State(gate): State<TokenGate>,
	mut request: Request,
	next: Next,
) -> Response {
	match gate.authorize(request.uri(), request.headers()) {
		Ok(context) => {
			request.extensions_mut().insert(context);

			next.run(request).await
		},
		Err(e) => {
			tracing::warn!(
				endpoint = request.uri().path(),
				method = %request.method(),
				error = %e,
				"invalid inbound token"
			);

			StatusCode::FORBIDDEN.into_response()
		},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::http::HeaderValue;
	// self
	use super::*;
	use crate::_preludet::{mint_inbound_token, sign_inbound_claims};

	const SECRET: &str = "gate-secret";

	fn token(secret: &str, expires_in: Duration) -> String {
		mint_inbound_token(secret, "T1", "C1", "U1", expires_in)
	}

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();

		headers.insert(AUTHORIZATION, HeaderValue::from_str(value).expect("Header should be valid."));

		headers
	}

	#[test]
	fn valid_token_yields_its_context() {
		let context =
			TokenGate::new(SECRET).verify(&token(SECRET, Duration::minutes(5))).expect("Token is valid.");

		assert_eq!(
			context,
			RequestContext { tenant_id: "T1".into(), conversation_id: "C1".into(), caller_id: "U1".into() }
		);
	}

	#[test]
	fn wrong_secret_is_rejected() {
		let err = TokenGate::new(SECRET)
			.verify(&token("other-secret", Duration::minutes(5)))
			.expect_err("Signature must not verify.");

		assert!(matches!(err, GateError::Rejected { .. }));
	}

	#[test]
	fn expired_token_is_rejected() {
		let err = TokenGate::new(SECRET)
			.verify(&token(SECRET, Duration::hours(-1)))
			.expect_err("Expired token must fail.");

		assert!(matches!(err, GateError::Rejected { .. }));
	}

	#[test]
	fn token_expired_moments_ago_gets_no_grace() {
		let err = TokenGate::new(SECRET)
			.verify(&token(SECRET, Duration::seconds(-30)))
			.expect_err("Expiry is enforced without leeway.");

		assert!(matches!(err, GateError::Rejected { .. }));
	}

	#[test]
	fn token_not_yet_valid_is_rejected() {
		let now = OffsetDateTime::now_utc();
		let raw = sign_inbound_claims(
			SECRET,
			Algorithm::HS256,
			&serde_json::json!({
				"sub": "U1",
				"nbf": (now + Duration::hours(1)).unix_timestamp(),
				"exp": (now + Duration::hours(2)).unix_timestamp(),
				"context": { "cloudId": "T1", "resourceId": "C1" },
			}),
		);
		let err = TokenGate::new(SECRET).verify(&raw).expect_err("A future nbf must fail.");

		assert!(matches!(err, GateError::Rejected { .. }));
	}

	#[test]
	fn wider_hmac_signatures_are_accepted() {
		let exp = (OffsetDateTime::now_utc() + Duration::minutes(5)).unix_timestamp();
		let claims = serde_json::json!({
			"sub": "U1",
			"exp": exp,
			"context": { "cloudId": "T1", "resourceId": "C1" },
		});

		for algorithm in [Algorithm::HS384, Algorithm::HS512] {
			let context = TokenGate::new(SECRET)
				.verify(&sign_inbound_claims(SECRET, algorithm, &claims))
				.expect("HMAC-SHA2 tokens should verify.");

			assert_eq!(context.caller_id, "U1");
		}

		let forged = sign_inbound_claims("other-secret", Algorithm::HS512, &claims);

		assert!(matches!(TokenGate::new(SECRET).verify(&forged), Err(GateError::Rejected { .. })));
	}

	#[test]
	fn garbage_is_malformed() {
		let err = TokenGate::new(SECRET).verify("not-a-token").expect_err("Garbage must fail.");

		assert!(matches!(err, GateError::Malformed { .. }));
	}

	#[test]
	fn missing_context_claim_is_rejected() {
		let raw = jsonwebtoken::encode(
			&jsonwebtoken::Header::default(),
			&serde_json::json!({ "sub": "U1" }),
			&jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
		)
		.expect("Token should encode.");

		assert!(matches!(TokenGate::new(SECRET).verify(&raw), Err(GateError::Rejected { .. })));
	}

	#[test]
	fn query_parameter_wins_over_header() {
		let uri: Uri = "/module/sidebar?foo=1&jwt=from-query".parse().expect("URI should parse.");

		assert_eq!(extract_token(&uri, &headers("Bearer from-header")).as_deref(), Some("from-query"));
	}

	#[test]
	fn header_bearer_prefix_is_stripped_and_other_schemes_are_verbatim() {
		let uri = Uri::from_static("/bot-mention");

		assert_eq!(extract_token(&uri, &headers("Bearer abc")).as_deref(), Some("abc"));
		assert_eq!(extract_token(&uri, &headers("abc")).as_deref(), Some("abc"));
		assert_eq!(extract_token(&uri, &headers("Bearer ")), None);
		assert_eq!(extract_token(&uri, &HeaderMap::new()), None);
	}

	#[test]
	fn empty_query_parameter_falls_back_to_header() {
		let uri: Uri = "/module/dialog?jwt=".parse().expect("URI should parse.");

		assert_eq!(extract_token(&uri, &headers("Bearer abc")).as_deref(), Some("abc"));
	}

	#[test]
	fn authorize_reports_missing_token() {
		let err = TokenGate::new(SECRET)
			.authorize(&Uri::from_static("/bot-mention"), &HeaderMap::new())
			.expect_err("No token must fail.");

		assert!(matches!(err, GateError::MissingToken));
	}
}
