//! Authenticator, refresh endpoint, and session client configuration.
//!
//! [`AuthenticatorConfig`] and [`SessionClientConfig`] deserialize from the host's settings
//! (durations are expressed in milliseconds), while [`RefreshEndpoint`] is validated through
//! [`RefreshEndpointBuilder`] so insecure or nonsensical endpoints fail before the first request.

// self
use crate::_prelude::*;

/// Tuning knobs for [`TokenAuthenticator`](crate::authenticator::TokenAuthenticator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticatorConfig {
	/// Pause applied after a successful refresh before the retried request is released.
	///
	/// Some backends take a moment to propagate a freshly issued session; the pause is a
	/// heuristic and can be set to zero.
	#[serde(rename = "settle_delay_ms", with = "duration_millis")]
	pub settle_delay: Duration,
	/// Serializes refreshes per stale refresh id so a burst of failures issues one network call.
	pub single_flight: bool,
}
impl AuthenticatorConfig {
	/// Default settling delay after a successful refresh.
	pub const DEFAULT_SETTLE_DELAY: Duration = Duration::milliseconds(50);

	/// Overrides the settling delay; negative values clamp to zero.
	pub fn with_settle_delay(mut self, delay: Duration) -> Self {
		self.settle_delay = if delay.is_negative() { Duration::ZERO } else { delay };

		self
	}

	/// Enables or disables per-refresh-id serialization.
	pub fn with_single_flight(mut self, enabled: bool) -> Self {
		self.single_flight = enabled;

		self
	}
}
impl Default for AuthenticatorConfig {
	fn default() -> Self {
		Self { settle_delay: Self::DEFAULT_SETTLE_DELAY, single_flight: true }
	}
}

/// Retry policy for [`SessionClient`](crate::client::SessionClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionClientConfig {
	/// Response statuses that trigger re-authentication.
	pub auth_failure_statuses: Vec<u16>,
	/// Maximum number of re-authenticated resends per call.
	pub max_auth_retries: u8,
}
impl SessionClientConfig {
	/// Returns `true` when `status` signals an authorization failure.
	pub fn is_auth_failure(&self, status: StatusCode) -> bool {
		self.auth_failure_statuses.contains(&status.as_u16())
	}

	/// Overrides the statuses that trigger re-authentication.
	pub fn with_auth_failure_statuses<I>(mut self, statuses: I) -> Self
	where
		I: IntoIterator<Item = u16>,
	{
		self.auth_failure_statuses = statuses.into_iter().collect();

		self
	}

	/// Overrides the maximum number of re-authenticated resends.
	pub fn with_max_auth_retries(mut self, retries: u8) -> Self {
		self.max_auth_retries = retries;

		self
	}
}
impl Default for SessionClientConfig {
	fn default() -> Self {
		Self { auth_failure_statuses: vec![StatusCode::UNAUTHORIZED.as_u16()], max_auth_retries: 1 }
	}
}

/// Errors raised while constructing or validating a [`RefreshEndpoint`].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RefreshEndpointError {
	/// Endpoint URL is mandatory.
	#[error("Missing refresh endpoint URL.")]
	MissingUrl,
	/// Only HTTP(S) endpoints are supported.
	#[error("The refresh endpoint must use HTTP(S): {url}.")]
	UnsupportedScheme {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Plain HTTP is limited to loopback hosts.
	#[error("The refresh endpoint must use HTTPS outside loopback hosts: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Timeouts must be positive.
	#[error("The refresh request timeout must be positive.")]
	InvalidTimeout,
	/// Extra header names or values must be valid HTTP tokens.
	#[error("Extra header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Header name that failed validation.
		name: String,
	},
}

/// Validated description of the credential-exchange endpoint.
#[derive(Clone, Debug)]
pub struct RefreshEndpoint {
	/// URL receiving the refresh request.
	pub url: Url,
	/// Per-request timeout applied to refresh calls.
	pub timeout: Duration,
	/// Static headers attached to every refresh request (API keys, client versions, etc.).
	pub extra_headers: HeaderMap,
}
impl RefreshEndpoint {
	/// Default timeout for refresh calls.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates an empty builder.
	pub fn builder() -> RefreshEndpointBuilder {
		RefreshEndpointBuilder::default()
	}

	/// Shortcut for an endpoint with default timeout and no extra headers.
	pub fn new(url: Url) -> Result<Self, RefreshEndpointError> {
		Self::builder().url(url).build()
	}

	/// Timeout converted for transports that take [`std::time::Duration`].
	pub fn std_timeout(&self) -> std::time::Duration {
		self.timeout.try_into().unwrap_or(std::time::Duration::ZERO)
	}
}

/// Builder for [`RefreshEndpoint`] values.
#[derive(Debug, Default)]
pub struct RefreshEndpointBuilder {
	/// Endpoint URL.
	pub url: Option<Url>,
	/// Optional timeout override.
	pub timeout: Option<Duration>,
	/// Raw extra headers, validated on build.
	pub extra_headers: Vec<(String, String)>,
}
impl RefreshEndpointBuilder {
	/// Sets the endpoint URL.
	pub fn url(mut self, url: Url) -> Self {
		self.url = Some(url);

		self
	}

	/// Overrides the request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Adds a static header sent with every refresh request.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_headers.push((name.into(), value.into()));

		self
	}

	/// Validates the configuration and produces a [`RefreshEndpoint`].
	pub fn build(self) -> Result<RefreshEndpoint, RefreshEndpointError> {
		let url = self.url.ok_or(RefreshEndpointError::MissingUrl)?;

		validate_url(&url)?;

		let timeout = self.timeout.unwrap_or(RefreshEndpoint::DEFAULT_TIMEOUT);

		if !timeout.is_positive() {
			return Err(RefreshEndpointError::InvalidTimeout);
		}

		let mut extra_headers = HeaderMap::new();

		for (name, value) in self.extra_headers {
			let header_name = HeaderName::from_bytes(name.as_bytes())
				.map_err(|_| RefreshEndpointError::InvalidHeader { name: name.clone() })?;
			let header_value = HeaderValue::from_str(&value)
				.map_err(|_| RefreshEndpointError::InvalidHeader { name: name.clone() })?;

			extra_headers.insert(header_name, header_value);
		}

		Ok(RefreshEndpoint { url, timeout, extra_headers })
	}
}

fn validate_url(url: &Url) -> Result<(), RefreshEndpointError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		"http" => Err(RefreshEndpointError::InsecureEndpoint { url: url.to_string() }),
		_ => Err(RefreshEndpointError::UnsupportedScheme { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		None => false,
	}
}

mod duration_millis {
	// crates.io
	use serde::{Deserialize, Deserializer, Serializer};
	use time::Duration;

	pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let millis = i64::try_from(value.whole_milliseconds()).unwrap_or(i64::MAX);

		serializer.serialize_i64(millis.max(0))
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		let millis = u64::deserialize(deserializer)?;

		Ok(Duration::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX)))
	}
}
