//! Optional observability helpers for authenticator flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `session_authenticator.flow` with the `flow`
//!   and `stage` (call site) fields, plus warn-level events describing refresh failures.
//! - Enable `metrics` to increment the `session_authenticator_flow_total` counter for every
//!   attempt/reuse/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the authenticator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Handling of a single failed request.
	Authenticate,
	/// Network exchange of a refresh id for a new pair.
	Refresh,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authenticate => "authenticate",
			FlowKind::Refresh => "refresh",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an authenticator helper.
	Attempt,
	/// A concurrent refresh already rotated the pair; no network call was made.
	Reused,
	/// Successful completion.
	Success,
	/// Failure absorbed into the neutral-credential fallback.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Reused => "reused",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
