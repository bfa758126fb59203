//! Thread-safe in-memory [`InstallationStore`] implementation; installations are lost on restart.

// std
use std::collections::hash_map::Entry;
// self
use crate::{
	_prelude::*,
	store::{Installation, InstallationStore, RecordOutcome, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<String, Installation>>>;

/// Storage backend that keeps installations in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn record_now(map: StoreMap, installation: Installation) -> Result<RecordOutcome, StoreError> {
		let mut guard = map.write();

		match guard.entry(installation.conversation_id.clone()) {
			Entry::Occupied(_) => Ok(RecordOutcome::AlreadyInstalled),
			Entry::Vacant(slot) => {
				slot.insert(installation);

				Ok(RecordOutcome::Inserted)
			},
		}
	}
}
impl InstallationStore for MemoryStore {
	fn record(&self, installation: Installation) -> StoreFuture<'_, RecordOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Self::record_now(map, installation) })
	}

	fn fetch<'a>(&'a self, conversation_id: &'a str) -> StoreFuture<'a, Option<Installation>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(conversation_id).cloned()) })
	}

	fn remove<'a>(&'a self, conversation_id: &'a str) -> StoreFuture<'a, Option<Installation>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(conversation_id)) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn installation(conversation_id: &str, installed_by: &str) -> Installation {
		Installation {
			cloud_id: "T1".into(),
			conversation_id: conversation_id.into(),
			installed_by: installed_by.into(),
		}
	}

	#[tokio::test]
	async fn first_installation_wins() {
		let store = MemoryStore::default();

		assert_eq!(
			store.record(installation("C1", "U1")).await.expect("Record should succeed."),
			RecordOutcome::Inserted
		);
		assert_eq!(
			store.record(installation("C1", "U2")).await.expect("Record should succeed."),
			RecordOutcome::AlreadyInstalled
		);

		let stored = store.fetch("C1").await.expect("Fetch should succeed.");

		assert_eq!(stored.map(|i| i.installed_by).as_deref(), Some("U1"));
		assert!(store.fetch("C2").await.expect("Fetch should succeed.").is_none());
	}

	#[tokio::test]
	async fn remove_forgets_the_conversation() {
		let store = MemoryStore::default();

		store.record(installation("C1", "U1")).await.expect("Record should succeed.");

		let removed = store.remove("C1").await.expect("Remove should succeed.");

		assert_eq!(removed, Some(installation("C1", "U1")));
		assert!(store.fetch("C1").await.expect("Fetch should succeed.").is_none());
		assert!(store.remove("C1").await.expect("Remove should succeed.").is_none());
	}
}
