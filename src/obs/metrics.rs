// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_authenticator_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a failed refresh attempt by error class (`terminal`, `transient`, `transport`, ...).
///
/// Waiters that adopt a shared failure are not counted; one attempt yields one sample.
pub fn record_refresh_failure(class: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_authenticator_refresh_failure_total",
			"class" => class
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = class;
	}
}
