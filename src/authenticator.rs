//! Token authenticator: race-aware re-authentication of requests that failed authorization.
//!
//! The transport hands [`TokenAuthenticator::authenticate`] the request that just came back
//! unauthorized. The authenticator compares the pair that request carried against the
//! [`CredentialStore`]:
//!
//! - If they differ (or the request carried no credentials), another caller already rotated the
//!   pair, so the request is rebuilt with the stored pair without touching the network.
//! - If they match, the pair is stale and the [`RefreshClient`] is asked for a new one. Success
//!   rotates the store through a compare-and-swap keyed by the stale refresh id, so a redundant
//!   refresh never overwrites a newer pair. Failure notifies the [`ExpiryNotifier`] and rebuilds
//!   the request with the empty pair, letting the retry fail predictably.
//!
//! With [`AuthenticatorConfig::single_flight`] enabled, callers holding the same stale refresh id
//! queue behind one slot. The first caller refreshes and publishes its [`Resolution`] in the slot;
//! the rest adopt it, so a burst of failures triggers exactly one refresh call and, when that call
//! fails, exactly one expiry notification.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, RefreshOutcome, SessionRequest},
	config::AuthenticatorConfig,
	notify::ExpiryNotifier,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	refresh::RefreshClient,
	store::{CompareAndSwapOutcome, CredentialStore},
};

/// How the authenticator settled on the pair for a retried request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
	/// The store already held a different pair; no refresh call was made.
	Reused(CredentialPair),
	/// A refresh completed and produced this pair.
	Refreshed(CredentialPair),
	/// The refresh failed; the expiry notifier fired and the empty pair is used.
	Expired,
}
impl Resolution {
	/// Returns the pair the retried request should carry.
	pub fn into_pair(self) -> CredentialPair {
		match self {
			Self::Reused(pair) | Self::Refreshed(pair) => pair,
			Self::Expired => CredentialPair::empty(),
		}
	}

	fn outcome(&self) -> FlowOutcome {
		match self {
			Self::Reused(_) => FlowOutcome::Reused,
			Self::Refreshed(_) => FlowOutcome::Success,
			Self::Expired => FlowOutcome::Failure,
		}
	}
}

type SlotTable = Mutex<HashMap<String, Arc<RefreshSlot>>>;

/// Single-flight slot shared by callers holding the same stale refresh id.
#[derive(Default)]
struct RefreshSlot {
	lock: AsyncMutex<()>,
	outcome: Mutex<Option<Resolution>>,
}

/// Keeps a slot alive while a caller waits on or holds it; the last lease out removes it.
struct SlotLease<'a> {
	table: &'a SlotTable,
	key: String,
	slot: Arc<RefreshSlot>,
}
impl Drop for SlotLease<'_> {
	fn drop(&mut self) {
		let mut table = self.table.lock();

		// Clones are only made under the table lock, so the count is stable here.
		if table.get(&self.key).is_some_and(|entry| Arc::ptr_eq(entry, &self.slot))
			&& Arc::strong_count(&self.slot) <= 2
		{
			table.remove(&self.key);
		}
	}
}

/// Re-authenticates requests that failed authorization.
pub struct TokenAuthenticator<R>
where
	R: ?Sized + RefreshClient,
{
	/// Store holding the current credential pair.
	pub store: Arc<dyn CredentialStore>,
	/// Client performing the refresh exchange.
	pub refresh_client: Arc<R>,
	/// Hook signalled whenever a refresh fails.
	pub notifier: Arc<dyn ExpiryNotifier>,
	/// Settling delay and single-flight settings.
	pub config: AuthenticatorConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guards: Arc<SlotTable>,
}
impl<R> TokenAuthenticator<R>
where
	R: ?Sized + RefreshClient,
{
	/// Creates an authenticator with the default configuration.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		refresh_client: impl Into<Arc<R>>,
		notifier: Arc<dyn ExpiryNotifier>,
	) -> Self {
		Self {
			store,
			refresh_client: refresh_client.into(),
			notifier,
			config: AuthenticatorConfig::default(),
			refresh_metrics: Default::default(),
			refresh_guards: Default::default(),
		}
	}

	/// Replaces the configuration.
	pub fn with_config(mut self, config: AuthenticatorConfig) -> Self {
		self.config = config;

		self
	}

	/// Rebuilds `failed` with up-to-date credentials.
	///
	/// Returns `None` when the request cannot be retried: its body cannot be replayed or the
	/// chosen pair cannot be encoded as header values. Refresh failures never surface here; they
	/// produce a request carrying the empty pair instead.
	pub async fn authenticate<Req>(&self, failed: &Req) -> Option<Req>
	where
		Req: SessionRequest,
	{
		const KIND: FlowKind = FlowKind::Authenticate;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		span.instrument(async move {
			let snapshot = CredentialPair::from_headers(failed.headers());
			let resolution = self.resolve(snapshot.as_ref()).await;

			obs::record_flow_outcome(KIND, resolution.outcome());

			let Some(mut retry) = failed.duplicate() else {
				obs::log_unretryable_request("request body cannot be replayed");

				return None;
			};

			if resolution.into_pair().apply_to(retry.headers_mut()).is_err() {
				obs::log_unretryable_request("credentials are not valid header values");

				return None;
			}

			Some(retry)
		})
		.await
	}

	/// Decides which pair a request that failed with `snapshot` should be retried with.
	///
	/// `snapshot` is `None` when the failed request carried no credential headers.
	pub async fn resolve(&self, snapshot: Option<&CredentialPair>) -> Resolution {
		let current = self.store.load();

		if snapshot != Some(&current) {
			self.refresh_metrics.record_reused();

			return Resolution::Reused(current);
		}
		if !self.config.single_flight {
			return self.refresh_from(current).await;
		}

		let lease = self.lease_refresh_slot(current.refresh_id.expose());
		let _singleflight = lease.slot.lock.lock().await;
		let latest = self.store.load();

		if latest != current {
			self.refresh_metrics.record_reused();

			return Resolution::Reused(latest);
		}

		// A leader that finished first published its result; adopt it instead of refreshing again.
		let published = lease.slot.outcome.lock().clone();

		match published {
			Some(Resolution::Refreshed(pair) | Resolution::Reused(pair)) => {
				self.refresh_metrics.record_reused();

				Resolution::Reused(pair)
			},
			Some(Resolution::Expired) => Resolution::Expired,
			None => {
				let resolution = self.refresh_from(current).await;

				*lease.slot.outcome.lock() = Some(resolution.clone());

				resolution
			},
		}
	}

	async fn refresh_from(&self, current: CredentialPair) -> Resolution {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");
		let stale_refresh = current.refresh_id.expose();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let outcome = if stale_refresh.is_empty() {
			RefreshOutcome::Failed(Error::InvalidRefreshId {
				reason: "no refresh id is stored".into(),
			})
		} else {
			span.instrument(self.refresh_client.refresh(stale_refresh)).await.into()
		};

		match outcome {
			RefreshOutcome::Refreshed(fresh) => {
				let chosen = match self.store.compare_and_swap(stale_refresh, fresh.clone()) {
					Ok(CompareAndSwapOutcome::Updated) => fresh,
					// A concurrent refresh already rotated the pair; keep the newer one.
					Ok(CompareAndSwapOutcome::RefreshMismatch) => self.store.load(),
					Err(err) => {
						obs::log_store_failure(&err);

						fresh
					},
				};

				obs::record_flow_outcome(KIND, FlowOutcome::Success);
				self.refresh_metrics.record_success();
				self.settle().await;

				Resolution::Refreshed(chosen)
			},
			RefreshOutcome::Failed(err) => {
				obs::log_refresh_failure(&err);
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::record_refresh_failure(err.class());
				self.refresh_metrics.record_failure();
				self.refresh_metrics.record_expiry();
				self.notifier.on_session_expired();

				Resolution::Expired
			},
		}
	}

	async fn settle(&self) {
		let Ok(delay) = std::time::Duration::try_from(self.config.settle_delay) else {
			return;
		};

		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
	}

	fn lease_refresh_slot(&self, stale_refresh: &str) -> SlotLease<'_> {
		let slot = self
			.refresh_guards
			.lock()
			.entry(stale_refresh.to_owned())
			.or_default()
			.clone();

		SlotLease { table: &self.refresh_guards, key: stale_refresh.to_owned(), slot }
	}
}
impl<R> Clone for TokenAuthenticator<R>
where
	R: ?Sized + RefreshClient,
{
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			refresh_client: self.refresh_client.clone(),
			notifier: self.notifier.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guards: self.refresh_guards.clone(),
		}
	}
}
impl<R> Debug for TokenAuthenticator<R>
where
	R: ?Sized + RefreshClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAuthenticator")
			.field("config", &self.config)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
