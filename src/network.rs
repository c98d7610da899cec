//! Network reachability capability consulted before refresh calls.

// std
use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the host currently has network connectivity.
///
/// Production hosts plug in their platform signal; refresh clients skip the socket entirely
/// when it reports no network.
pub trait NetworkMonitor
where
	Self: Send + Sync,
{
	/// Returns `true` when outbound requests can reach the network.
	fn is_network_available(&self) -> bool;
}

/// Monitor that always reports the network as available.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysAvailable;
impl NetworkMonitor for AlwaysAvailable {
	fn is_network_available(&self) -> bool {
		true
	}
}

/// Monitor backed by a flag the host flips from its own connectivity callbacks.
#[derive(Debug)]
pub struct NetworkFlag(AtomicBool);
impl NetworkFlag {
	/// Creates a flag with the provided initial state.
	pub fn new(available: bool) -> Self {
		Self(AtomicBool::new(available))
	}

	/// Records a connectivity change.
	pub fn set_available(&self, available: bool) {
		self.0.store(available, Ordering::Release);
	}
}
impl Default for NetworkFlag {
	fn default() -> Self {
		Self::new(true)
	}
}
impl NetworkMonitor for NetworkFlag {
	fn is_network_available(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flag_tracks_connectivity_changes() {
		let flag = NetworkFlag::default();

		assert!(flag.is_network_available());

		flag.set_available(false);

		assert!(!flag.is_network_available());
		assert!(AlwaysAvailable.is_network_available());
	}
}
