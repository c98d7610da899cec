//! Authenticator-level error types shared across stores, refresh clients, and the session client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; the next authorization failure will try again.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeout, reachability).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Server rejected the refresh identifier (expired or revoked); the user must log in again.
	#[error("Refresh identifier was rejected: {reason}.")]
	InvalidRefreshId {
		/// Server- or strategy-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when the failure cannot be recovered without a fresh login.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::InvalidRefreshId { .. })
	}

	/// Returns a stable label describing the failure class for logs and metrics.
	pub const fn class(&self) -> &'static str {
		match self {
			Self::InvalidRefreshId { .. } => "terminal",
			Self::Transient(_) => "transient",
			Self::Transport(_) => "transport",
			Self::Config(_) => "config",
			Self::Storage(_) => "storage",
		}
	}
}

/// Local failures raised while encoding credentials or refresh payloads.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A credential cannot be encoded as an HTTP header value.
	#[error("Credential for header `{header}` is not a valid header value.")]
	InvalidHeaderValue {
		/// Header that failed to encode.
		header: &'static str,
	},
	/// Refresh request payload could not be serialized.
	#[error("Refresh request payload could not be serialized.")]
	RequestEncode(#[source] serde_json::Error),
}

/// Temporary failure variants (safe to retry on the next authorization failure).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Refresh endpoint returned an unexpected but non-fatal response.
	#[error("Refresh endpoint returned an unexpected response: {message}.")]
	RefreshEndpoint {
		/// Server- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Refresh endpoint responded with a body that could not be parsed.
	#[error("Refresh endpoint returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Human-readable description of the remote call.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for a response.
	#[error("Timed out while calling {target}.")]
	Timeout {
		/// Human-readable description of the remote call.
		target: &'static str,
	},
	/// The injected reachability check reported no network.
	#[error("Network is unavailable.")]
	NetworkUnavailable,
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `target`.
	pub fn network(target: &'static str, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { target, source: Box::new(src) }
	}

	#[cfg(feature = "reqwest")]
	pub(crate) fn from_reqwest(target: &'static str, e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { target } } else { Self::network(target, e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_invalid_refresh_id_is_terminal() {
		let terminal = Error::InvalidRefreshId { reason: "revoked".into() };
		let transient: Error =
			TransientError::RefreshEndpoint { message: "busy".into(), status: Some(503) }.into();
		let transport: Error = TransportError::NetworkUnavailable.into();

		assert!(terminal.is_terminal());
		assert!(!transient.is_terminal());
		assert!(!transport.is_terminal());
		assert_eq!(terminal.class(), "terminal");
		assert_eq!(transient.class(), "transient");
		assert_eq!(transport.class(), "transport");
	}

	#[test]
	fn encoding_failures_surface_as_config_errors() {
		let err: Error = crate::auth::CredentialPair::new("s1\n", "r1")
			.apply_to(&mut HeaderMap::new())
			.expect_err("Control characters should not encode as header values.")
			.into();

		assert!(!err.is_terminal());
		assert_eq!(err.class(), "config");
		assert_eq!(
			err.to_string(),
			"Credential for header `x-session-id` is not a valid header value."
		);
	}

	#[test]
	fn display_messages_are_sentences() {
		let err = Error::InvalidRefreshId { reason: "refresh id expired".into() };

		assert_eq!(err.to_string(), "Refresh identifier was rejected: refresh id expired.");
		assert_eq!(
			Error::from(TransportError::Timeout { target: "the refresh endpoint" }).to_string(),
			"Timed out while calling the refresh endpoint."
		);
	}
}
