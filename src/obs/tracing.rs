// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by authenticator flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("session_authenticator.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warn event describing a failed refresh.
///
/// Terminal failures (revoked refresh id) and transient ones share the fallback path, so the
/// class label is the only place the distinction survives.
pub fn log_refresh_failure(err: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			class = err.class(),
			terminal = err.is_terminal(),
			error = %err,
			"Session refresh failed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}

/// Emits an error event for a credential store write that could not be persisted.
pub fn log_store_failure(err: &crate::store::StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(error = %err, "Failed to persist refreshed credentials.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}

/// Emits a debug event when a request cannot be rebuilt for a retry.
pub fn log_unretryable_request(reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(reason, "Failed request cannot be re-authenticated.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}
