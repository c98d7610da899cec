//! Reqwest-backed [`RefreshClient`].

// crates.io
use http::header::{ACCEPT, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	config::RefreshEndpoint,
	error::TransportError,
	network::{AlwaysAvailable, NetworkMonitor},
	refresh::{
		DefaultRefreshStrategy, RefreshClient, RefreshFuture, RefreshRequest, RefreshStrategy,
		classify_error_response, parse_refresh_response,
	},
};

const TARGET: &str = "the refresh endpoint";

/// Exchanges refresh ids over HTTP with a JSON payload.
///
/// Token endpoints answer directly, so configure any custom [`ReqwestClient`] not to follow
/// redirects. The endpoint's timeout is applied per request and surfaces as
/// [`TransportError::Timeout`].
#[derive(Clone)]
pub struct ReqwestRefreshClient {
	client: ReqwestClient,
	endpoint: RefreshEndpoint,
	strategy: Arc<dyn RefreshStrategy>,
	network: Arc<dyn NetworkMonitor>,
}
impl ReqwestRefreshClient {
	/// Creates a client for `endpoint` with the default strategy and reachability monitor.
	pub fn new(endpoint: RefreshEndpoint) -> Self {
		Self {
			client: ReqwestClient::default(),
			endpoint,
			strategy: Arc::new(DefaultRefreshStrategy),
			network: Arc::new(AlwaysAvailable),
		}
	}

	/// Replaces the underlying reqwest client.
	pub fn with_client(mut self, client: ReqwestClient) -> Self {
		self.client = client;

		self
	}

	/// Replaces the error classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn RefreshStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the network reachability monitor.
	pub fn with_network_monitor(mut self, network: Arc<dyn NetworkMonitor>) -> Self {
		self.network = network;

		self
	}

	/// Endpoint this client talks to.
	pub fn endpoint(&self) -> &RefreshEndpoint {
		&self.endpoint
	}

	async fn exchange(&self, refresh_id: &str) -> Result<CredentialPair> {
		if !self.network.is_network_available() {
			return Err(TransportError::NetworkUnavailable.into());
		}

		let body = RefreshRequest { refresh_id }.to_json()?;
		let mut headers = self.endpoint.extra_headers.clone();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
		self.strategy.augment_refresh_request(&mut headers);

		let response = self
			.client
			.post(self.endpoint.url.clone())
			.headers(headers)
			.timeout(self.endpoint.std_timeout())
			.body(body)
			.send()
			.await
			.map_err(|e| TransportError::from_reqwest(TARGET, e))?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(|e| TransportError::from_reqwest(TARGET, e))?;

		if status.is_success() {
			parse_refresh_response(Some(status.as_u16()), &bytes)
		} else {
			Err(classify_error_response(self.strategy.as_ref(), status.as_u16(), &bytes))
		}
	}
}
impl RefreshClient for ReqwestRefreshClient {
	fn refresh<'a>(&'a self, refresh_id: &'a str) -> RefreshFuture<'a, CredentialPair> {
		Box::pin(self.exchange(refresh_id))
	}
}
impl Debug for ReqwestRefreshClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestRefreshClient").field("endpoint", &self.endpoint.url.as_str()).finish()
	}
}
