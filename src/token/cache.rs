//! Single-slot access-token cache with in-flight fetch de-duplication.
//!
//! [`TokenCache::access_token`] hands out the cached token while `now <= expires_at`. When the
//! token is missing or stale, the first caller registers one shared fetch and every caller that
//! arrives before it settles awaits that same fetch, success or failure. The staleness check and
//! the registration happen inside one synchronous critical section, so two callers can never
//! both observe "no fetch in flight". The fetch clears its own registration when it settles,
//! which is what lets the next call retry after a failure.

// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{
	_prelude::*,
	obs::{self, Op, OpOutcome, OpSpan},
	token::{CachedToken, TokenSecret, TokenSource},
};

type SharedFetch = Shared<BoxFuture<'static, Result<CachedToken, Arc<Error>>>>;

#[derive(Default)]
struct CacheState {
	cached: Option<CachedToken>,
	in_flight: Option<SharedFetch>,
}

/// Owned access-token cache held by the REST client for the lifetime of the process.
pub struct TokenCache {
	source: Arc<dyn TokenSource>,
	state: Arc<Mutex<CacheState>>,
	refresh_margin: Duration,
}
impl TokenCache {
	/// Safety margin subtracted from the server-side lifetime.
	pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::seconds(60);

	/// Creates an empty cache backed by `source`.
	pub fn new(source: Arc<dyn TokenSource>) -> Self {
		Self {
			source,
			state: Default::default(),
			refresh_margin: Self::DEFAULT_REFRESH_MARGIN,
		}
	}

	/// Overrides the refresh margin (defaults to 60 seconds). Negative values clamp to zero.
	pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Returns a usable access token, fetching one only when none is fresh.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		let fetch = {
			let mut state = self.state.lock();

			if let Some(token) =
				state.cached.as_ref().filter(|token| token.is_fresh_at(OffsetDateTime::now_utc()))
			{
				return Ok(token.value.clone());
			}

			if let Some(fetch) = state.in_flight.clone() {
				tracing::debug!("token fetch already in flight, awaiting it");

				fetch
			} else {
				let fetch = self.start_fetch();

				state.in_flight = Some(fetch.clone());

				fetch
			}
		};

		fetch.await.map(|token| token.value).map_err(Error::TokenFetch)
	}

	/// Returns the cached token record without fetching, fresh or not.
	pub fn peek(&self) -> Option<CachedToken> {
		self.state.lock().cached.clone()
	}

	/// Reports whether a fetch is currently registered.
	pub fn is_fetching(&self) -> bool {
		self.state.lock().in_flight.is_some()
	}

	fn start_fetch(&self) -> SharedFetch {
		const OP: Op = Op::TokenFetch;

		let source = Arc::clone(&self.source);
		let state = Arc::clone(&self.state);
		let refresh_margin = self.refresh_margin;
		let span = OpSpan::new(OP, "access_token");

		span.instrument(async move {
			obs::record_op_outcome(OP, OpOutcome::Attempt);

			let result =
				source.fetch().await.map(|issued| CachedToken::from_issued(issued, refresh_margin));
			let mut slot = state.lock();

			slot.in_flight = None;

			match result {
				Ok(token) => {
					tracing::info!(expires_at = %token.expires_at, "got a token");
					obs::record_op_outcome(OP, OpOutcome::Success);

					slot.cached = Some(token.clone());

					Ok(token)
				},
				Err(e) => {
					tracing::error!(error = %e, "token request failed");
					obs::record_op_outcome(OP, OpOutcome::Failure);

					Err(Arc::new(e))
				},
			}
		})
		.boxed()
		.shared()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("TokenCache")
			.field("cached_until", &state.cached.as_ref().map(|token| token.expires_at))
			.field("fetching", &state.in_flight.is_some())
			.field("refresh_margin", &self.refresh_margin)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::token::{IssuedToken, TokenFuture};

	struct CountingSource {
		calls: AtomicUsize,
		lifetime: Duration,
		fail_first: usize,
	}
	impl CountingSource {
		fn new(lifetime: Duration) -> Self {
			Self { calls: AtomicUsize::new(0), lifetime, fail_first: 0 }
		}

		fn failing_first(mut self, count: usize) -> Self {
			self.fail_first = count;

			self
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl TokenSource for CountingSource {
		fn fetch(&self) -> TokenFuture<'_> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
			let lifetime = self.lifetime;
			let fail = call <= self.fail_first;

			Box::pin(async move {
				tokio::time::sleep(std::time::Duration::from_millis(20)).await;

				if fail {
					Err(Error::InvalidClient { reason: format!("attempt {call} rejected") })
				} else {
					Ok(IssuedToken::new(format!("token-{call}"), lifetime))
				}
			})
		}
	}

	fn cache(source: &Arc<CountingSource>) -> TokenCache {
		TokenCache::new(source.clone())
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_fetch() {
		let source = Arc::new(CountingSource::new(Duration::hours(1)));
		let cache = cache(&source);
		let (first, second, third) =
			tokio::join!(cache.access_token(), cache.access_token(), cache.access_token());

		assert_eq!(first.expect("First caller should get a token.").expose(), "token-1");
		assert_eq!(second.expect("Second caller should get a token.").expose(), "token-1");
		assert_eq!(third.expect("Third caller should get a token.").expose(), "token-1");
		assert_eq!(source.calls(), 1);
		assert!(!cache.is_fetching());
	}

	#[tokio::test]
	async fn fresh_token_is_served_without_fetching() {
		let source = Arc::new(CountingSource::new(Duration::hours(1)));
		let cache = cache(&source);

		cache.access_token().await.expect("Initial fetch should succeed.");

		let again = cache.access_token().await.expect("Cached token should be returned.");

		assert_eq!(again.expose(), "token-1");
		assert_eq!(source.calls(), 1);
	}

	#[tokio::test]
	async fn stale_token_triggers_exactly_one_refetch() {
		let source = Arc::new(CountingSource::new(Duration::seconds(30)));
		let cache = cache(&source);

		cache.access_token().await.expect("Initial fetch should succeed.");

		let (first, second) = tokio::join!(cache.access_token(), cache.access_token());

		assert_eq!(first.expect("Refetch should succeed.").expose(), "token-2");
		assert_eq!(second.expect("Refetch should be shared.").expose(), "token-2");
		assert_eq!(source.calls(), 2);
	}

	#[tokio::test]
	async fn failure_reaches_every_awaiter_and_does_not_poison() {
		let source = Arc::new(CountingSource::new(Duration::hours(1)).failing_first(1));
		let cache = cache(&source);
		let (first, second) = tokio::join!(cache.access_token(), cache.access_token());

		for result in [first, second] {
			let err = result.expect_err("Both awaiters should observe the failure.");

			assert!(matches!(
				err,
				Error::TokenFetch(ref inner) if matches!(**inner, Error::InvalidClient { .. })
			));
		}

		assert_eq!(source.calls(), 1);
		assert!(!cache.is_fetching());

		let retry = cache.access_token().await.expect("Next call should fetch again.");

		assert_eq!(retry.expose(), "token-2");
		assert_eq!(source.calls(), 2);
	}

	#[tokio::test]
	async fn refresh_margin_clamps_negative_values() {
		let source = Arc::new(CountingSource::new(Duration::seconds(30)));
		let cache = cache(&source).with_refresh_margin(Duration::seconds(-5));

		cache.access_token().await.expect("Fetch should succeed.");
		cache.access_token().await.expect("Token should be reused.");

		assert_eq!(source.calls(), 1);
		assert!(cache.peek().is_some());
	}
}
