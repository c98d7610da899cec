// std
use std::{sync::Arc, thread};
// self
use session_authenticator::{
	auth::CredentialPair,
	store::{CompareAndSwapOutcome, CredentialStore, MemoryStore},
};

fn generation(n: usize) -> CredentialPair {
	CredentialPair::new(format!("session-{n}"), format!("refresh-{n}"))
}

fn generation_of(pair: &CredentialPair) -> (String, String) {
	let session = pair.session_id.expose().trim_start_matches("session-").to_owned();
	let refresh = pair.refresh_id.expose().trim_start_matches("refresh-").to_owned();

	(session, refresh)
}

#[test]
fn readers_never_observe_a_mixed_pair() {
	let store = Arc::new(MemoryStore::new(generation(0)));
	let writers = (0..4)
		.map(|writer| {
			let store = store.clone();

			thread::spawn(move || {
				for n in 0..500 {
					store
						.save(generation(writer * 1_000 + n))
						.expect("Memory store save should not fail.");
				}
			})
		})
		.collect::<Vec<_>>();
	let readers = (0..4)
		.map(|_| {
			let store = store.clone();

			thread::spawn(move || {
				for _ in 0..2_000 {
					let (session, refresh) = generation_of(&store.load());

					assert_eq!(session, refresh, "Session and refresh ids must come from one save.");
				}
			})
		})
		.collect::<Vec<_>>();

	for handle in writers.into_iter().chain(readers) {
		handle.join().expect("Store worker thread should not panic.");
	}
}

#[test]
fn concurrent_rotations_from_one_generation_have_one_winner() {
	let store = Arc::new(MemoryStore::new(generation(0)));
	let contenders = (1..=8)
		.map(|n| {
			let store = store.clone();

			thread::spawn(move || {
				store
					.compare_and_swap("refresh-0", generation(n))
					.expect("Memory store CAS should not fail.")
			})
		})
		.collect::<Vec<_>>();
	let outcomes = contenders
		.into_iter()
		.map(|handle| handle.join().expect("CAS worker thread should not panic."))
		.collect::<Vec<_>>();
	let winners = outcomes.iter().filter(|outcome| **outcome == CompareAndSwapOutcome::Updated);

	assert_eq!(winners.count(), 1);

	let (session, refresh) = generation_of(&store.load());

	assert_eq!(session, refresh);
	assert_ne!(session, "0");
}

#[test]
fn default_helpers_follow_the_stored_pair() {
	let store = MemoryStore::default();

	assert!(store.load().is_empty());

	store.save(generation(7)).expect("Memory store save should not fail.");

	assert_eq!(store.session_id(), "session-7");
	assert_eq!(store.refresh_id(), "refresh-7");

	store.clear().expect("Memory store clear should not fail.");

	assert!(store.load().is_empty());
}
