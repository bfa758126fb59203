//! Access-token domain: the redacted secret wrapper, the issued/cached token records, and the
//! single-slot cache that de-duplicates concurrent fetches.

pub mod cache;
pub mod secret;

pub use cache::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`TokenSource::fetch`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<IssuedToken>> + 'a + Send>>;

/// Something that can mint a fresh access token, typically the token endpoint.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Requests a new access token.
	fn fetch(&self) -> TokenFuture<'_>;
}

/// Access token exactly as the token endpoint issued it.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Bearer credential.
	pub access_token: TokenSecret,
	/// Server-side lifetime.
	pub expires_in: Duration,
	/// Instant the response was received.
	pub issued_at: OffsetDateTime,
}
impl IssuedToken {
	/// Records a token received now.
	pub fn new(access_token: impl Into<String>, expires_in: Duration) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			expires_in,
			issued_at: OffsetDateTime::now_utc(),
		}
	}
}

/// Cached access token plus the instant after which it must be refetched.
#[derive(Clone, Debug)]
pub struct CachedToken {
	/// Bearer credential.
	pub value: TokenSecret,
	/// Last instant the token may be handed out.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Derives the cache record, pulling the expiry forward by `refresh_margin`.
	pub fn from_issued(issued: IssuedToken, refresh_margin: Duration) -> Self {
		Self {
			value: issued.access_token,
			expires_at: issued.issued_at + (issued.expires_in - refresh_margin),
		}
	}

	/// Returns `true` while the token may still be reused.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now <= self.expires_at
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn refresh_margin_is_subtracted_from_server_ttl() {
		let issued = IssuedToken {
			access_token: TokenSecret::new("token"),
			expires_in: Duration::hours(1),
			issued_at: datetime!(2026-01-01 00:00 UTC),
		};
		let cached = CachedToken::from_issued(issued, Duration::seconds(60));

		assert_eq!(cached.expires_at, datetime!(2026-01-01 00:59 UTC));
		assert!(cached.is_fresh_at(datetime!(2026-01-01 00:59 UTC)));
		assert!(!cached.is_fresh_at(datetime!(2026-01-01 00:59:01 UTC)));
	}

	#[test]
	fn lifetime_shorter_than_margin_is_stale_immediately() {
		let issued = IssuedToken::new("short", Duration::seconds(30));
		let issued_at = issued.issued_at;
		let cached = CachedToken::from_issued(issued, Duration::seconds(60));

		assert!(!cached.is_fresh_at(issued_at));
	}
}
