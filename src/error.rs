//! Crate-level error types shared by the token cache, the REST client, the gate, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Stride REST call failed after the request left the process.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Inbound token was missing or failed verification.
	#[error(transparent)]
	Gate(#[from] crate::gate::GateError),

	/// Token endpoint answered with an error or an unusable response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
	},
	/// Token endpoint rejected the app credentials.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// A required operation argument was empty.
	#[error("Stride/{op}: missing param {param}!")]
	MissingParam {
		/// Operation label.
		op: &'static str,
		/// Parameter name.
		param: &'static str,
	},
	/// The webhook server could not bind or serve.
	#[error("Webhook server I/O failed.")]
	Server(#[source] std::io::Error),
	/// Shared access-token fetch failed; every caller awaiting that fetch receives this error.
	#[error("Access token fetch failed.")]
	TokenFetch(#[source] Arc<Error>),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured URL could not be parsed.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The API base URL cannot carry path segments.
	#[error("API base URL `{0}` cannot be used as a base.")]
	CannotBeABase(String),
	/// A required environment variable is absent.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds an unusable value.
	#[error("Environment variable `{name}` has an invalid value `{value}`.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Raw value.
		value: String,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// App descriptor template could not be read.
	#[error("App descriptor template `{path}` could not be read.")]
	DescriptorTemplate {
		/// Template path.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a URL parsing failure together with the offending value.
	pub fn invalid_url(value: impl Into<String>, source: url::ParseError) -> Self {
		Self::InvalidUrl { value: value.into(), source }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Endpoint label.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised by the token endpoint call.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the token endpoint", source: Box::new(src) }
	}

	/// Wraps a transport-specific network error raised by a Stride API call.
	pub fn api(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the Stride API", source: Box::new(src) }
	}

	/// Wraps a failure downloading a file that is then uploaded to a conversation.
	pub fn download(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target: "the media host", source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures reported by the Stride REST API once a response arrived.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// The API answered with a non-success status.
	#[error("Stride API request `{op}` failed with status {status}.")]
	Status {
		/// Operation label.
		op: &'static str,
		/// HTTP status code.
		status: u16,
		/// Response body, kept for diagnostics.
		body: String,
	},
	/// The response body did not match the expected shape.
	#[error("Stride API response for `{op}` could not be decoded.")]
	Decode {
		/// Operation label.
		op: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// The direct conversation lookup did not return a conversation id.
	#[error("Error getting details about the direct conversation with user `{user_id}`.")]
	MissingDirectConversation {
		/// User the conversation was requested for.
		user_id: String,
	},
}
