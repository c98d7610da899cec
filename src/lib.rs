//! Session-token refresh authenticator for HTTP clients: race-aware single-flight refreshes,
//! atomic credential stores, and expiry notifications in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authenticator;
#[cfg(feature = "reqwest")] pub mod client;
pub mod config;
pub mod error;
pub mod network;
pub mod notify;
pub mod obs;
pub mod refresh;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use crate::{
		auth::CredentialPair,
		authenticator::TokenAuthenticator,
		config::AuthenticatorConfig,
		error::TransientError,
		notify::ExpiryNotifier,
		refresh::{RefreshClient, RefreshFuture},
		store::{CredentialStore, MemoryStore},
	};

	/// Scripted [`RefreshClient`] that replays queued outcomes and records every call.
	#[derive(Debug, Default)]
	pub struct ScriptedRefreshClient {
		script: Mutex<VecDeque<Result<CredentialPair>>>,
		fallback: Option<CredentialPair>,
		calls: Mutex<Vec<String>>,
		latency: Option<std::time::Duration>,
	}
	impl ScriptedRefreshClient {
		/// Client that answers every call with the provided pair.
		pub fn always(pair: CredentialPair) -> Self {
			Self { fallback: Some(pair), ..Default::default() }
		}

		/// Client that rejects every refresh id as revoked.
		pub fn always_invalid() -> Self {
			Self::default()
		}

		/// Queues a single outcome consumed by the next call.
		pub fn push(self, outcome: Result<CredentialPair>) -> Self {
			self.script.lock().push_back(outcome);

			self
		}

		/// Delays every response, widening race windows in concurrency tests.
		pub fn with_latency(mut self, latency: std::time::Duration) -> Self {
			self.latency = Some(latency);

			self
		}

		/// Returns the refresh ids received so far.
		pub fn calls(&self) -> Vec<String> {
			self.calls.lock().clone()
		}

		/// Returns the number of refresh calls received so far.
		pub fn call_count(&self) -> usize {
			self.calls.lock().len()
		}

		fn next_outcome(&self) -> Result<CredentialPair> {
			if let Some(outcome) = self.script.lock().pop_front() {
				return outcome;
			}

			match &self.fallback {
				Some(pair) => Ok(pair.clone()),
				None => Err(Error::InvalidRefreshId { reason: "refresh id has been revoked".into() }),
			}
		}
	}
	impl RefreshClient for ScriptedRefreshClient {
		fn refresh<'a>(&'a self, refresh_id: &'a str) -> RefreshFuture<'a, CredentialPair> {
			Box::pin(async move {
				self.calls.lock().push(refresh_id.to_owned());

				if let Some(latency) = self.latency {
					tokio::time::sleep(latency).await;
				}

				self.next_outcome()
			})
		}
	}

	/// [`ExpiryNotifier`] that counts notifications.
	#[derive(Debug, Default)]
	pub struct CountingNotifier(AtomicUsize);
	impl CountingNotifier {
		/// Returns the number of expiry notifications received.
		pub fn count(&self) -> usize {
			self.0.load(Ordering::SeqCst)
		}
	}
	impl ExpiryNotifier for CountingNotifier {
		fn on_session_expired(&self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	/// Builds a transient refresh failure suitable for scripting.
	pub fn transient_failure(message: &str) -> Error {
		TransientError::RefreshEndpoint { message: message.into(), status: Some(503) }.into()
	}

	/// Authenticator fixture wired with a memory store, scripted client, and counting notifier.
	pub struct AuthenticatorFixture {
		/// Authenticator under test.
		pub authenticator: TokenAuthenticator<ScriptedRefreshClient>,
		/// Store shared with the authenticator.
		pub store: Arc<MemoryStore>,
		/// Scripted refresh client shared with the authenticator.
		pub refresh_client: Arc<ScriptedRefreshClient>,
		/// Notifier shared with the authenticator.
		pub notifier: Arc<CountingNotifier>,
	}

	/// Builds an [`AuthenticatorFixture`] seeded with `initial` and a zero settling delay.
	pub fn build_test_authenticator(
		initial: CredentialPair,
		refresh_client: ScriptedRefreshClient,
	) -> AuthenticatorFixture {
		build_test_authenticator_with_config(
			initial,
			refresh_client,
			AuthenticatorConfig::default().with_settle_delay(Duration::ZERO),
		)
	}

	/// Same as [`build_test_authenticator`] with an explicit configuration.
	pub fn build_test_authenticator_with_config(
		initial: CredentialPair,
		refresh_client: ScriptedRefreshClient,
		config: AuthenticatorConfig,
	) -> AuthenticatorFixture {
		let store = Arc::new(MemoryStore::new(initial));
		let refresh_client = Arc::new(refresh_client);
		let notifier = Arc::new(CountingNotifier::default());
		let authenticator = TokenAuthenticator::new(
			store.clone() as Arc<dyn CredentialStore>,
			refresh_client.clone(),
			notifier.clone() as Arc<dyn ExpiryNotifier>,
		)
		.with_config(config);

		AuthenticatorFixture { authenticator, store, refresh_client, notifier }
	}

	/// Builds a pair from plain string fixtures.
	pub fn pair(session_id: &str, refresh_id: &str) -> CredentialPair {
		CredentialPair::new(session_id, refresh_id)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
