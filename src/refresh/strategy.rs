//! Strategy hooks that customize refresh requests and classify refresh failures.
//!
//! Implementations decorate outgoing refresh requests and decide which error responses mean the
//! refresh id is gone for good, without tying the authenticator to any particular HTTP client.

// self
use crate::_prelude::*;

/// Strategy hook that allows backends to decorate requests and classify errors.
///
/// Override only what you need; `augment_refresh_request` defaults to a no-op.
pub trait RefreshStrategy: Send + Sync {
	/// Maps an error response from the refresh endpoint into a failure class.
	fn classify_refresh_error(&self, ctx: &RefreshErrorContext) -> RefreshErrorKind;

	/// Gives backends a chance to add headers (device ids, client versions) before dispatching.
	fn augment_refresh_request(&self, _headers: &mut HeaderMap) {}
}

/// Canonical refresh failure classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshErrorKind {
	/// The refresh id expired or was revoked; only a new login helps.
	InvalidRefreshId,
	/// Failure is temporary; the next authorization failure may succeed.
	Transient,
}

/// Context passed to strategies when classifying refresh errors.
///
/// Keeps only primitive data (status code, error fields, body preview) so strategies stay
/// decoupled from the HTTP client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshErrorContext {
	/// HTTP status code returned by the endpoint, when available.
	pub http_status: Option<u16>,
	/// Machine-readable error code from the response body.
	pub error_code: Option<String>,
	/// Human-readable message from the response body.
	pub message: Option<String>,
	/// Preview of the raw response body.
	pub body_preview: Option<String>,
}
impl RefreshErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an HTTP status code (e.g., 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the error code string returned by the endpoint.
	pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
		self.error_code = Some(code.into());

		self
	}

	/// Adds the human-readable error message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}

	/// Adds a (truncated) body preview.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy for session backends.
///
/// It prioritizes the structured error code, then falls back to body text hints, and finally
/// the HTTP status code.
#[derive(Debug, Default)]
pub struct DefaultRefreshStrategy;
impl Display for DefaultRefreshStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-refresh-strategy")
	}
}
impl RefreshStrategy for DefaultRefreshStrategy {
	fn classify_refresh_error(&self, ctx: &RefreshErrorContext) -> RefreshErrorKind {
		if let Some(kind) = ctx.error_code.as_deref().and_then(match_error_code) {
			return kind;
		}
		if let Some(kind) = classify_body(ctx.message.as_deref())
			.or_else(|| classify_body(ctx.body_preview.as_deref()))
		{
			return kind;
		}

		classify_status(ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= RefreshErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf: String = body.chars().take(RefreshErrorContext::BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}

fn match_error_code(value: &str) -> Option<RefreshErrorKind> {
	const TERMINAL: [&str; 5] =
		["invalid_refresh_id", "invalid_grant", "session_expired", "refresh_expired", "revoked"];
	const TRANSIENT: [&str; 3] = ["temporarily_unavailable", "server_error", "rate_limited"];

	if TERMINAL.iter().any(|code| value.eq_ignore_ascii_case(code)) {
		Some(RefreshErrorKind::InvalidRefreshId)
	} else if TRANSIENT.iter().any(|code| value.eq_ignore_ascii_case(code)) {
		Some(RefreshErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<RefreshErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(RefreshErrorKind::Transient),
		text if text.contains("invalid_refresh")
			|| text.contains("invalid_grant")
			|| text.contains("revoked")
			|| text.contains("expired") =>
			Some(RefreshErrorKind::InvalidRefreshId),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> RefreshErrorKind {
	match status {
		Some(400 | 401 | 403 | 404 | 410) => RefreshErrorKind::InvalidRefreshId,
		_ => RefreshErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn error_code_takes_precedence_over_status() {
		let strategy = DefaultRefreshStrategy;
		let ctx = RefreshErrorContext::new()
			.with_http_status(401)
			.with_error_code("temporarily_unavailable");

		assert_eq!(strategy.classify_refresh_error(&ctx), RefreshErrorKind::Transient);

		let ctx = RefreshErrorContext::new().with_http_status(500).with_error_code("SESSION_EXPIRED");

		assert_eq!(strategy.classify_refresh_error(&ctx), RefreshErrorKind::InvalidRefreshId);
	}

	#[test]
	fn falls_back_to_body_then_status() {
		let strategy = DefaultRefreshStrategy;
		let body_ctx =
			RefreshErrorContext::new().with_http_status(500).with_body_preview("refresh id revoked");

		assert_eq!(strategy.classify_refresh_error(&body_ctx), RefreshErrorKind::InvalidRefreshId);
		assert_eq!(
			strategy.classify_refresh_error(&RefreshErrorContext::new().with_http_status(401)),
			RefreshErrorKind::InvalidRefreshId
		);
		assert_eq!(
			strategy.classify_refresh_error(&RefreshErrorContext::new().with_http_status(429)),
			RefreshErrorKind::Transient
		);
		assert_eq!(
			strategy.classify_refresh_error(&RefreshErrorContext::new()),
			RefreshErrorKind::Transient
		);
	}

	#[test]
	fn body_preview_is_truncated() {
		let ctx = RefreshErrorContext::new().with_body_preview("x".repeat(1_000));
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), RefreshErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}

	#[test]
	fn custom_strategy_can_augment_requests() {
		struct DeviceStrategy;
		impl RefreshStrategy for DeviceStrategy {
			fn classify_refresh_error(&self, _ctx: &RefreshErrorContext) -> RefreshErrorKind {
				RefreshErrorKind::InvalidRefreshId
			}

			fn augment_refresh_request(&self, headers: &mut HeaderMap) {
				headers.insert("x-device-id", HeaderValue::from_static("device-42"));
			}
		}

		let mut headers = HeaderMap::new();

		DeviceStrategy.augment_refresh_request(&mut headers);

		assert_eq!(headers.get("x-device-id"), Some(&HeaderValue::from_static("device-42")));
	}
}
