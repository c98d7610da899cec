//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialPair};

/// Single source of truth for the current [`CredentialPair`].
///
/// Reads never wait on I/O and may run from any number of callers. Writes replace both
/// identifiers together, so no observer ever sees a session id from one generation paired with
/// a refresh id from another.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns a consistent snapshot of both identifiers.
	fn load(&self) -> CredentialPair;

	/// Atomically replaces both identifiers.
	fn save(&self, pair: CredentialPair) -> Result<(), StoreError>;

	/// Replaces the stored pair only if its refresh id still equals `expected_refresh_id`.
	fn compare_and_swap(
		&self,
		expected_refresh_id: &str,
		replacement: CredentialPair,
	) -> Result<CompareAndSwapOutcome, StoreError>;

	/// Returns the current session identifier.
	fn session_id(&self) -> String {
		self.load().session_id.expose().to_owned()
	}

	/// Returns the current refresh identifier.
	fn refresh_id(&self) -> String {
		self.load().refresh_id.expose().to_owned()
	}

	/// Resets the store to the empty pair (logout).
	fn clear(&self) -> Result<(), StoreError> {
		self.save(CredentialPair::empty())
	}
}

/// Result of a refresh-id compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The refresh id matched the expected value and the pair was replaced.
	Updated,
	/// Another writer already replaced the pair; the store was left untouched.
	RefreshMismatch,
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let err: Error = store_error.clone().into();

		assert!(matches!(err, Error::Storage(_)));
		assert!(err.to_string().contains("disk full"));

		let source = StdError::source(&err)
			.expect("Crate error should expose the store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn default_accessors_read_from_snapshot() {
		let store = MemoryStore::new(CredentialPair::new("s1", "r1"));

		assert_eq!(store.session_id(), "s1");
		assert_eq!(store.refresh_id(), "r1");

		store.clear().expect("Memory store clear should not fail.");

		assert!(store.load().is_empty());
	}

	#[test]
	fn compare_and_swap_outcome_can_be_serialized() {
		let payload = serde_json::to_string(&CompareAndSwapOutcome::RefreshMismatch)
			.expect("CompareAndSwapOutcome should serialize to JSON.");

		assert_eq!(payload, "\"RefreshMismatch\"");
	}
}
