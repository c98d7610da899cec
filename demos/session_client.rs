//! Demonstrates a session client recovering from an expired session: the first API call comes
//! back unauthorized, the authenticator rotates the pair, and the retried call succeeds.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use tokio::sync::mpsc;
use url::Url;
// self
use session_authenticator::{
	auth::CredentialPair,
	authenticator::TokenAuthenticator,
	client::SessionClient,
	config::RefreshEndpoint,
	http::Method,
	notify::{ChannelNotifier, ExpiryNotifier},
	refresh::ReqwestRefreshClient,
	reqwest::Client,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("x-session-id", "login-session");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("x-session-id", "rotated-session");
			then.status(200).header("content-type", "application/json").body("{\"name\":\"demo\"}");
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/session/refresh");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":{\"sessionId\":\"rotated-session\",\"refreshId\":\"rotated-refresh\"}}",
			);
		})
		.await;
	let store = Arc::new(MemoryStore::new(CredentialPair::new("login-session", "login-refresh")));
	let (expiry_tx, mut expiry_rx) = mpsc::unbounded_channel();
	let notifier: Arc<dyn ExpiryNotifier> = Arc::new(ChannelNotifier::new(expiry_tx));
	let endpoint =
		RefreshEndpoint::builder().url(Url::parse(&server.url("/session/refresh"))?).build()?;
	let authenticator = <TokenAuthenticator<ReqwestRefreshClient>>::new(
		store.clone() as Arc<dyn CredentialStore>,
		ReqwestRefreshClient::new(endpoint),
		notifier,
	);
	let client = SessionClient::new(Client::new(), authenticator);
	let request =
		client.request(Method::GET, Url::parse(&server.url("/v1/profile"))?).build()?;
	let response = client.execute(request).await?;

	println!("Profile call finished with status {}.", response.status());
	println!("Session now stored: {:?}.", store.load());

	refresh_mock.assert_async().await;

	if expiry_rx.try_recv().is_ok() {
		println!("Session expired; the user must log in again.");
	}

	Ok(())
}
