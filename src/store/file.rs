//! Simple file-backed [`CredentialStore`] for hosts that keep the session across restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	store::{CompareAndSwapOutcome, CredentialStore, StoreError},
};

/// Persists the pair to a JSON file after each mutation.
///
/// Reads are served from memory and never wait on disk. Writers are serialized by a separate
/// lock, persist first, and only then swap the in-memory pair, so a failed write leaves both the
/// file and memory on the previous pair. Writes block the calling thread for the duration of the
/// file sync.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<CredentialPair>>,
	writer: Arc<Mutex<()>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)), writer: Default::default() })
	}

	/// Returns the path backing this store.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<CredentialPair, StoreError> {
		if !path.exists() {
			return Ok(CredentialPair::empty());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(CredentialPair::empty());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist(&self, pair: &CredentialPair) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(pair).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize credential snapshot: {e}"),
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> CredentialPair {
		self.inner.read().clone()
	}

	fn save(&self, pair: CredentialPair) -> Result<(), StoreError> {
		let _writer = self.writer.lock();

		self.persist(&pair)?;
		*self.inner.write() = pair;

		Ok(())
	}

	fn compare_and_swap(
		&self,
		expected_refresh_id: &str,
		replacement: CredentialPair,
	) -> Result<CompareAndSwapOutcome, StoreError> {
		let _writer = self.writer.lock();

		// Only writers change the pair, so the check stays valid while `_writer` is held.
		if self.inner.read().refresh_id.expose() != expected_refresh_id {
			return Ok(CompareAndSwapOutcome::RefreshMismatch);
		}

		self.persist(&replacement)?;
		*self.inner.write() = replacement;

		Ok(CompareAndSwapOutcome::Updated)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process, time::SystemTime};
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let nanos = SystemTime::now()
			.duration_since(SystemTime::UNIX_EPOCH)
			.map(|elapsed| elapsed.as_nanos())
			.unwrap_or_default();

		env::temp_dir().join(format!("session_authenticator_{label}_{}_{nanos}.json", process::id()))
	}

	#[test]
	fn missing_file_opens_empty() {
		let path = temp_path("missing");
		let store = FileStore::open(&path).expect("Opening a missing snapshot should succeed.");

		assert!(store.load().is_empty());
		assert!(!path.exists());
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save(CredentialPair::new("s1", "r1"))
			.expect("Failed to save fixture pair to file store.");
		store
			.compare_and_swap("r1", CredentialPair::new("s2", "r2"))
			.expect("CAS against the current refresh id should succeed.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert_eq!(reopened.load(), CredentialPair::new("s2", "r2"));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_persist_keeps_previous_pair() {
		let path = temp_path("blocked");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save(CredentialPair::new("s1", "r1"))
			.expect("Failed to save fixture pair to file store.");
		fs::remove_file(&path).expect("Failed to remove snapshot before blocking it.");
		fs::create_dir(&path).expect("Failed to block the snapshot path with a directory.");

		let err = store
			.compare_and_swap("r1", CredentialPair::new("s2", "r2"))
			.expect_err("Renaming onto a directory should fail.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert_eq!(store.load(), CredentialPair::new("s1", "r1"));
		assert!(store.save(CredentialPair::new("s3", "r3")).is_err());
		assert_eq!(store.load(), CredentialPair::new("s1", "r1"));

		fs::remove_dir(&path).expect("Failed to remove blocking directory.");

		let mut tmp_path = path.clone();

		tmp_path.set_extension("tmp");

		let _ = fs::remove_file(&tmp_path);
	}

	#[test]
	fn reads_proceed_while_a_writer_is_active() {
		let path = temp_path("reads");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save(CredentialPair::new("s1", "r1"))
			.expect("Failed to save fixture pair to file store.");

		let writer = store.writer.lock();

		assert_eq!(store.load(), CredentialPair::new("s1", "r1"));
		assert_eq!(store.refresh_id(), "r1");

		drop(writer);
		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_reports_serialization_error() {
		let path = temp_path("corrupt");

		fs::write(&path, b"{not json").expect("Failed to write corrupt snapshot fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshots should fail to load.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
