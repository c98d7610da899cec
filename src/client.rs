//! Session-aware reqwest client that re-authenticates unauthorized requests.
//!
//! [`SessionClient::execute`] attaches the stored credentials to requests that carry none, sends
//! them, and hands every response whose status is listed in
//! [`SessionClientConfig::auth_failure_statuses`] to the [`TokenAuthenticator`]. The rebuilt
//! request is resent at most [`SessionClientConfig::max_auth_retries`] times, after which the last
//! response is returned unchanged.

// crates.io
use http::Method;
use reqwest::{Request, RequestBuilder, Response};
// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	authenticator::TokenAuthenticator,
	config::SessionClientConfig,
	error::TransportError,
	refresh::{RefreshClient, ReqwestRefreshClient},
};

const TARGET: &str = "the API";

/// HTTP client that keeps requests authenticated with the current session.
pub struct SessionClient<R = ReqwestRefreshClient>
where
	R: ?Sized + RefreshClient,
{
	http_client: ReqwestClient,
	authenticator: TokenAuthenticator<R>,
	config: SessionClientConfig,
}
impl<R> SessionClient<R>
where
	R: ?Sized + RefreshClient,
{
	/// Wraps `http_client` so its requests are re-authenticated by `authenticator`.
	pub fn new(http_client: ReqwestClient, authenticator: TokenAuthenticator<R>) -> Self {
		Self { http_client, authenticator, config: SessionClientConfig::default() }
	}

	/// Replaces the retry policy.
	pub fn with_config(mut self, config: SessionClientConfig) -> Self {
		self.config = config;

		self
	}

	/// Authenticator driving re-authentication.
	pub fn authenticator(&self) -> &TokenAuthenticator<R> {
		&self.authenticator
	}

	/// Starts building a request against `url`.
	pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
		self.http_client.request(method, url)
	}

	/// Sends `request`, re-authenticating it when the response signals an authorization failure.
	pub async fn execute(&self, mut request: Request) -> Result<Response> {
		if CredentialPair::from_headers(request.headers()).is_none() {
			let current = self.authenticator.store.load();

			if !current.is_empty() {
				current.apply_to(request.headers_mut())?;
			}
		}

		let mut retries_left = self.config.max_auth_retries;

		loop {
			let replay = if retries_left > 0 { request.try_clone() } else { None };
			let response = self
				.http_client
				.execute(request)
				.await
				.map_err(|e| TransportError::from_reqwest(TARGET, e))?;

			if retries_left == 0 || !self.config.is_auth_failure(response.status()) {
				return Ok(response);
			}

			let Some(failed) = replay else {
				return Ok(response);
			};
			let Some(rebuilt) = self.authenticator.authenticate(&failed).await else {
				return Ok(response);
			};

			retries_left -= 1;
			request = rebuilt;
		}
	}
}
impl<R> Debug for SessionClient<R>
where
	R: ?Sized + RefreshClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("authenticator", &self.authenticator)
			.field("config", &self.config)
			.finish()
	}
}
