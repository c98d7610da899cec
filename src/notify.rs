//! Expiry notification hooks invoked when a refresh fails.
//!
//! The authenticator holds its notifier explicitly, so hosts decide where the signal goes: a
//! closure, a channel drained by the UI task, or nowhere at all.

// crates.io
use tokio::sync::mpsc::UnboundedSender;

/// Marker delivered through channel-backed notifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionExpired;

/// Receives a signal whenever the session can no longer be refreshed.
///
/// Implementations must return promptly and must not panic; the authenticator calls them inline
/// on the request path.
pub trait ExpiryNotifier
where
	Self: Send + Sync,
{
	/// Signals the host application that a new login is required.
	fn on_session_expired(&self);
}
impl<F> ExpiryNotifier for F
where
	F: Fn() + Send + Sync,
{
	fn on_session_expired(&self) {
		self()
	}
}

/// Notifier that forwards each signal to an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelNotifier(UnboundedSender<SessionExpired>);
impl ChannelNotifier {
	/// Wraps the sending half of a channel drained by the host.
	pub fn new(sender: UnboundedSender<SessionExpired>) -> Self {
		Self(sender)
	}
}
impl From<UnboundedSender<SessionExpired>> for ChannelNotifier {
	fn from(sender: UnboundedSender<SessionExpired>) -> Self {
		Self::new(sender)
	}
}
impl ExpiryNotifier for ChannelNotifier {
	fn on_session_expired(&self) {
		// A dropped receiver means nobody is listening anymore.
		let _ = self.0.send(SessionExpired);
	}
}

/// Notifier that discards every signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;
impl ExpiryNotifier for NoopNotifier {
	fn on_session_expired(&self) {}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};
	// crates.io
	use tokio::sync::mpsc;
	// self
	use super::*;

	#[test]
	fn closures_act_as_notifiers() {
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = hits.clone();
		let notifier = move || {
			counter.fetch_add(1, Ordering::SeqCst);
		};

		notifier.on_session_expired();
		notifier.on_session_expired();

		assert_eq!(hits.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn channel_notifier_delivers_and_tolerates_closed_receiver() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let notifier = ChannelNotifier::from(tx);

		notifier.on_session_expired();

		assert_eq!(rx.try_recv(), Ok(SessionExpired));

		drop(rx);
		notifier.on_session_expired();
	}
}
