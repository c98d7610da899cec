//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	store::{CompareAndSwapOutcome, CredentialStore, StoreError},
};

/// Thread-safe store that keeps the pair in-process.
///
/// Clones share the same underlying slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<CredentialPair>>);
impl MemoryStore {
	/// Creates a store seeded with `initial` (typically the pair issued at login).
	pub fn new(initial: CredentialPair) -> Self {
		Self(Arc::new(RwLock::new(initial)))
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> CredentialPair {
		self.0.read().clone()
	}

	fn save(&self, pair: CredentialPair) -> Result<(), StoreError> {
		*self.0.write() = pair;

		Ok(())
	}

	fn compare_and_swap(
		&self,
		expected_refresh_id: &str,
		replacement: CredentialPair,
	) -> Result<CompareAndSwapOutcome, StoreError> {
		let mut guard = self.0.write();

		if guard.refresh_id.expose() != expected_refresh_id {
			return Ok(CompareAndSwapOutcome::RefreshMismatch);
		}

		*guard = replacement;

		Ok(CompareAndSwapOutcome::Updated)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn compare_and_swap_only_replaces_matching_generation() {
		let store = MemoryStore::new(CredentialPair::new("s1", "r1"));
		let first = store
			.compare_and_swap("r1", CredentialPair::new("s2", "r2"))
			.expect("Memory store CAS should not fail.");
		let second = store
			.compare_and_swap("r1", CredentialPair::new("s3", "r3"))
			.expect("Memory store CAS should not fail.");

		assert_eq!(first, CompareAndSwapOutcome::Updated);
		assert_eq!(second, CompareAndSwapOutcome::RefreshMismatch);
		assert_eq!(store.load(), CredentialPair::new("s2", "r2"));
	}

	#[test]
	fn clones_share_state() {
		let store = MemoryStore::default();
		let view = store.clone();

		store.save(CredentialPair::new("s1", "r1")).expect("Memory store save should not fail.");

		assert_eq!(view.session_id(), "s1");
	}
}
