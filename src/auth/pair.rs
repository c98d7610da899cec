//! Session/refresh identifier pair attached to every authenticated request.

// self
use crate::{
	_prelude::*,
	auth::{REFRESH_ID_HEADER, SESSION_ID_HEADER, Secret},
	error::ConfigError,
};

/// Currently valid authorization pair.
///
/// Session and refresh identifiers always travel together: stores replace both at once and
/// requests carry both headers or neither.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
	/// Session identifier sent with every request.
	pub session_id: Secret,
	/// Refresh identifier exchanged for a new pair when the session expires.
	pub refresh_id: Secret,
}
impl CredentialPair {
	/// Creates a pair from raw identifiers.
	pub fn new(session_id: impl Into<String>, refresh_id: impl Into<String>) -> Self {
		Self { session_id: Secret::new(session_id), refresh_id: Secret::new(refresh_id) }
	}

	/// Neutral pair (empty identifiers) used after a failed refresh.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Returns `true` when both identifiers are empty.
	pub fn is_empty(&self) -> bool {
		self.session_id.is_empty() && self.refresh_id.is_empty()
	}

	/// Extracts the pair carried by a request's headers.
	///
	/// Returns `None` unless both headers are present and valid UTF-8, which is how a request
	/// sent before any login looks.
	pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
		let session_id = headers.get(SESSION_ID_HEADER)?.to_str().ok()?;
		let refresh_id = headers.get(REFRESH_ID_HEADER)?.to_str().ok()?;

		Some(Self::new(session_id, refresh_id))
	}

	/// Replaces both credential headers with this pair.
	pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), ConfigError> {
		let session = HeaderValue::from_str(self.session_id.expose())
			.map_err(|_| ConfigError::InvalidHeaderValue { header: SESSION_ID_HEADER })?;
		let refresh = HeaderValue::from_str(self.refresh_id.expose())
			.map_err(|_| ConfigError::InvalidHeaderValue { header: REFRESH_ID_HEADER })?;

		headers.insert(HeaderName::from_static(SESSION_ID_HEADER), session);
		headers.insert(HeaderName::from_static(REFRESH_ID_HEADER), refresh);

		Ok(())
	}
}

/// Result of a single refresh attempt, consumed immediately by the authenticator.
#[derive(Debug)]
pub enum RefreshOutcome {
	/// The refresh endpoint issued a new pair.
	Refreshed(CredentialPair),
	/// The refresh call failed for the contained reason.
	Failed(Error),
}
impl From<Result<CredentialPair>> for RefreshOutcome {
	fn from(result: Result<CredentialPair>) -> Self {
		match result {
			Ok(pair) => Self::Refreshed(pair),
			Err(err) => Self::Failed(err),
		}
	}
}
