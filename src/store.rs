//! Storage contract for app installations, plus the in-memory implementation the server uses.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`InstallationStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Record of the app being installed in one conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
	/// Site id.
	pub cloud_id: String,
	/// Conversation id, the store key.
	pub conversation_id: String,
	/// User who installed the app.
	pub installed_by: String,
}

/// Whether [`InstallationStore::record`] stored a new installation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOutcome {
	/// No installation existed for the conversation; the new one was stored.
	Inserted,
	/// An installation already existed and was kept unchanged.
	AlreadyInstalled,
}

/// Storage backend contract for installations keyed by conversation id.
pub trait InstallationStore
where
	Self: Send + Sync,
{
	/// Stores `installation` unless one already exists for its conversation.
	fn record(&self, installation: Installation) -> StoreFuture<'_, RecordOutcome>;

	/// Fetches the installation for a conversation, if present.
	fn fetch<'a>(&'a self, conversation_id: &'a str) -> StoreFuture<'a, Option<Installation>>;

	/// Removes and returns the installation for a conversation.
	fn remove<'a>(&'a self, conversation_id: &'a str) -> StoreFuture<'a, Option<Installation>>;
}

/// Error type produced by [`InstallationStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
