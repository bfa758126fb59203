//! Stride reference app: webhook handlers guarded by a signed-token gate, plus a REST client
//! that shares one cached client-credentials access token across every outbound call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod config;
pub mod demo;
pub mod document;
pub mod error;
pub mod event;
pub mod gate;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod server;
pub mod store;
pub mod token;
#[cfg(any(test, feature = "test"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests.

	pub use crate::_prelude::*;

	// crates.io
	use jsonwebtoken::{Algorithm, EncodingKey, Header};
	use serde_json::Value;

	/// Client identifier used by test fixtures.
	pub const TEST_CLIENT_ID: &str = "refapp-client";
	/// Client secret used by test fixtures; also signs inbound test tokens.
	pub const TEST_CLIENT_SECRET: &str = "refapp-secret";

	/// Signs arbitrary `claims` with `secret` using `algorithm`.
	pub fn sign_inbound_claims(secret: &str, algorithm: Algorithm, claims: &Value) -> String {
		jsonwebtoken::encode(
			&Header::new(algorithm),
			claims,
			&EncodingKey::from_secret(secret.as_bytes()),
		)
		.expect("Inbound test token should encode.")
	}

	/// Signs an inbound token the way the platform does for webhook calls.
	pub fn mint_inbound_token(
		secret: &str,
		cloud_id: &str,
		conversation_id: &str,
		user_id: &str,
		expires_in: Duration,
	) -> String {
		let now = OffsetDateTime::now_utc();
		let claims = serde_json::json!({
			"iss": "stride",
			"sub": user_id,
			"aud": TEST_CLIENT_ID,
			"iat": now.unix_timestamp(),
			"exp": (now + expires_in).unix_timestamp(),
			"context": { "cloudId": cloud_id, "resourceId": conversation_id },
		});

		sign_inbound_claims(secret, Algorithm::HS256, &claims)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Only the binary target reports through these.
use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, tower as _};
