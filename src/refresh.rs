//! Refresh client contract and the wire format of the credential exchange.
//!
//! A [`RefreshClient`] trades the current refresh id for a new [`CredentialPair`]. Failures stay
//! distinguishable: transport problems surface as [`Error::Transport`], a rejected refresh id as
//! [`Error::InvalidRefreshId`], and unusable payloads as [`TransientError::MalformedResponse`].
//! The authenticator folds them into a single fallback path but logs the class of each.

pub mod strategy;

#[cfg(feature = "reqwest")] mod http_client;

#[cfg(feature = "reqwest")] pub use http_client::ReqwestRefreshClient;
pub use strategy::*;

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	error::{ConfigError, TransientError},
};

/// Boxed future returned by [`RefreshClient::refresh`].
pub type RefreshFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Performs the credential-exchange network call.
///
/// Calls are independent and may run concurrently; implementations keep no state beyond their
/// configuration.
pub trait RefreshClient
where
	Self: Send + Sync,
{
	/// Exchanges `refresh_id` for a new session/refresh pair.
	fn refresh<'a>(&'a self, refresh_id: &'a str) -> RefreshFuture<'a, CredentialPair>;
}

/// Request payload sent to the refresh endpoint.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
	/// Refresh id currently held by the credential store.
	pub refresh_id: &'a str,
}
impl RefreshRequest<'_> {
	/// Serializes the payload as JSON.
	pub fn to_json(&self) -> Result<Vec<u8>> {
		serde_json::to_vec(self).map_err(|e| ConfigError::RequestEncode(e).into())
	}
}

#[derive(Deserialize)]
struct RefreshEnvelope {
	data: CredentialPair,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
	error: Option<String>,
	code: Option<String>,
	message: Option<String>,
}

/// Parses a successful refresh response (`{"data":{"sessionId":…,"refreshId":…}}`).
pub fn parse_refresh_response(status: Option<u16>, body: &[u8]) -> Result<CredentialPair> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let envelope: RefreshEnvelope = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransientError::MalformedResponse { source, status })?;

	Ok(envelope.data)
}

/// Maps a non-success refresh response into the crate error taxonomy.
pub fn classify_error_response(strategy: &dyn RefreshStrategy, status: u16, body: &[u8]) -> Error {
	let mut ctx = RefreshErrorContext::new().with_http_status(status);

	if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
		if let Some(code) = envelope.error.or(envelope.code) {
			ctx = ctx.with_error_code(code);
		}
		if let Some(message) = envelope.message {
			ctx = ctx.with_message(message);
		}
	}
	if !body.is_empty() {
		ctx = ctx.with_body_preview(String::from_utf8_lossy(body));
	}

	let reason = ctx
		.message
		.clone()
		.or_else(|| ctx.error_code.clone())
		.unwrap_or_else(|| format!("HTTP {status}"));

	match strategy.classify_refresh_error(&ctx) {
		RefreshErrorKind::InvalidRefreshId => Error::InvalidRefreshId { reason },
		RefreshErrorKind::Transient =>
			TransientError::RefreshEndpoint { message: reason, status: Some(status) }.into(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_payload_uses_camel_case() {
		let payload = RefreshRequest { refresh_id: "r1" }
			.to_json()
			.expect("Refresh payload should serialize.");

		assert_eq!(payload, br#"{"refreshId":"r1"}"#);
	}

	#[test]
	fn parses_enveloped_pair() {
		let pair = parse_refresh_response(
			Some(200),
			br#"{"status":"ok","data":{"sessionId":"s2","refreshId":"r2"}}"#,
		)
		.expect("Well-formed envelope should parse.");

		assert_eq!(pair, CredentialPair::new("s2", "r2"));
	}

	#[test]
	fn malformed_payload_reports_failing_path() {
		let err = parse_refresh_response(Some(200), br#"{"data":{"sessionId":"s2"}}"#)
			.expect_err("Missing refresh id should fail to parse.");

		match err {
			Error::Transient(TransientError::MalformedResponse { source, status }) => {
				assert_eq!(status, Some(200));
				assert!(source.path().to_string().starts_with("data"));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn error_responses_are_classified() {
		let strategy = DefaultRefreshStrategy;
		let revoked = classify_error_response(
			&strategy,
			401,
			br#"{"error":"invalid_refresh_id","message":"refresh id revoked"}"#,
		);
		let busy = classify_error_response(&strategy, 503, b"upstream unavailable");

		assert!(
			matches!(&revoked, Error::InvalidRefreshId { reason } if reason == "refresh id revoked")
		);
		assert!(matches!(
			busy,
			Error::Transient(TransientError::RefreshEndpoint { status: Some(503), .. })
		));
	}
}
