// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};
// crates.io
use parking_lot::Mutex;
// self
use auth_facade::{
	auth::Session,
	config::{FacadeConfig, Platform},
	facade::AuthFacade,
	outcome::{AuthFailure, AuthResult, ErrorKind},
	provider::{
		IdentityProvider, MemoryIdentityProvider,
		memory::{PopupOutcome, ProviderOperation},
	},
	store::{FileSessionStore, SessionStore},
};

const PASSWORD: &str = "hunter22";

fn config(platform: Platform) -> FacadeConfig {
	FacadeConfig::builder()
		.platform(platform)
		.request_timeout(None)
		.build()
		.expect("Facade config should build.")
}

fn facade() -> (AuthFacade<MemoryIdentityProvider>, Arc<MemoryIdentityProvider>) {
	let provider = Arc::new(MemoryIdentityProvider::default());

	(AuthFacade::new(provider.clone(), config(Platform::Web)), provider)
}

fn recorder() -> (Arc<Mutex<Vec<Option<String>>>>, impl Fn(Option<&Session>) + Send + Sync) {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = seen.clone();

	(seen, move |session: Option<&Session>| {
		sink.lock().push(session.and_then(|s| s.email.clone()))
	})
}

#[tokio::test]
async fn observers_receive_initial_state_then_each_transition() {
	let (facade, provider) = facade();

	provider.add_password_account("ada@example.com", PASSWORD);

	let (seen, listener) = recorder();
	let _subscription = facade.observe_session_changes(listener);

	assert_eq!(*seen.lock(), vec![None]);

	facade
		.sign_in_with_password("ada@example.com", PASSWORD)
		.await
		.into_result()
		.expect("Sign-in should succeed.");

	// Token refreshes are transitions too.
	provider.refresh_tokens().await.expect("A signed-in session should refresh.");
	facade.sign_out().await.into_result().expect("Sign-out should succeed.");

	assert_eq!(
		*seen.lock(),
		vec![
			None,
			Some("ada@example.com".to_owned()),
			Some("ada@example.com".to_owned()),
			None
		]
	);

	let (late, listener) = recorder();
	let _late = facade.observe_session_changes(listener);

	assert_eq!(*late.lock(), vec![None]);
}

#[tokio::test]
async fn failed_operations_do_not_notify() {
	let (facade, provider) = facade();
	let (seen, listener) = recorder();
	let _subscription = facade.observe_session_changes(listener);

	assert!(!facade.sign_in_with_password("nobody@example.com", PASSWORD).await.is_success());

	provider.script_popup(PopupOutcome::closed_by_user());

	assert!(facade.sign_in_with_third_party().await.is_cancelled());
	assert_eq!(*seen.lock(), vec![None]);
}

#[tokio::test]
async fn listeners_are_never_reentered() {
	let (facade, provider) = facade();
	let in_listener = Arc::new(AtomicBool::new(false));
	let overlaps = Arc::new(AtomicUsize::new(0));
	let deliveries = Arc::new(AtomicUsize::new(0));
	let state = provider.session_state().clone();
	let _subscription = {
		let in_listener = in_listener.clone();
		let overlaps = overlaps.clone();
		let deliveries = deliveries.clone();

		facade.observe_session_changes(move |session: Option<&Session>| {
			if in_listener.swap(true, Ordering::SeqCst) {
				overlaps.fetch_add(1, Ordering::SeqCst);
			}

			deliveries.fetch_add(1, Ordering::SeqCst);

			// Revoke from inside the listener; the sign-out is queued, not delivered inline.
			if session.is_some() {
				state.replace(None);
			}

			in_listener.store(false, Ordering::SeqCst);
		})
	};

	provider.add_password_account("ada@example.com", PASSWORD);
	facade
		.sign_in_with_password("ada@example.com", PASSWORD)
		.await
		.into_result()
		.expect("Sign-in should succeed.");

	assert_eq!(overlaps.load(Ordering::SeqCst), 0);
	assert_eq!(deliveries.load(Ordering::SeqCst), 3);
	assert_eq!(facade.current_session(), None);
}

#[test]
fn concurrent_transitions_are_delivered_once_each_without_overlap() {
	for _ in 0..50 {
		let (facade, provider) = facade();
		let in_listener = Arc::new(AtomicBool::new(false));
		let overlaps = Arc::new(AtomicUsize::new(0));
		let transitions = Arc::new(AtomicUsize::new(0));
		let (seen, record) = recorder();
		let _subscription = {
			let in_listener = in_listener.clone();
			let overlaps = overlaps.clone();

			facade.observe_session_changes(move |session: Option<&Session>| {
				if in_listener.swap(true, Ordering::SeqCst) {
					overlaps.fetch_add(1, Ordering::SeqCst);
				}

				record(session);
				in_listener.store(false, Ordering::SeqCst);
			})
		};
		let handles = (0..4)
			.map(|worker| {
				let state = provider.session_state().clone();
				let transitions = transitions.clone();

				std::thread::spawn(move || {
					for round in 0..10 {
						let session = Session::new(
							format!("uid-{worker}-{round}").parse().expect("Uid should be valid."),
						)
						.with_email(format!("{worker}-{round}@example.com"));

						if state.replace(Some(session)) {
							transitions.fetch_add(1, Ordering::SeqCst);
						}
						if round % 3 == 0 && state.replace(None) {
							transitions.fetch_add(1, Ordering::SeqCst);
						}
					}
				})
			})
			.collect::<Vec<_>>();

		for handle in handles {
			handle.join().expect("Worker thread should not panic.");
		}

		let seen = seen.lock();

		assert_eq!(overlaps.load(Ordering::SeqCst), 0);
		assert_eq!(seen.len(), 1 + transitions.load(Ordering::SeqCst));
		assert_eq!(
			seen.last().cloned().flatten(),
			facade.current_session().and_then(|s| s.email)
		);
	}
}

#[tokio::test]
async fn unsupported_platforms_reject_third_party_sign_in() {
	for platform in [Platform::Ios, Platform::Android, Platform::Desktop] {
		let provider = Arc::new(MemoryIdentityProvider::default());
		let facade: AuthFacade<MemoryIdentityProvider> = AuthFacade::new(provider.clone(), config(platform));
		let result = facade.sign_in_with_third_party().await;

		assert_eq!(
			result.failure(),
			Some(&AuthFailure::rejected(
				ErrorKind::UnsupportedPlatform,
				"third-party sign-in not available on this platform"
			))
		);
		assert_eq!(provider.calls(ProviderOperation::SignInWithPopup), 0);
	}
}

#[tokio::test]
async fn cancellation_is_distinct_from_failures() {
	let (facade, provider) = facade();

	provider.script_popup(PopupOutcome::closed_by_user());
	provider.script_popup(PopupOutcome::identity("ada@example.com"));

	let cancelled = facade.sign_in_with_third_party().await;
	let signed_in = facade.sign_in_with_third_party().await;

	assert!(cancelled.is_cancelled());
	assert_eq!(cancelled.message(), "");
	assert_eq!(cancelled.failure().and_then(AuthFailure::reason), None);
	assert_eq!(signed_in.message(), "Signed in with Google successfully");

	// Nothing scripted: the provider refuses the popup.
	let refused = facade.sign_in_with_third_party().await;

	assert!(!refused.is_cancelled());
	assert_eq!(
		refused.failure().and_then(AuthFailure::reason),
		Some(ErrorKind::OperationNotAllowed)
	);
}

#[tokio::test]
async fn sign_out_success_and_failure() {
	let (facade, provider) = facade();

	provider.add_password_account("ada@example.com", PASSWORD);
	facade
		.sign_in_with_password("ada@example.com", PASSWORD)
		.await
		.into_result()
		.expect("Sign-in should succeed.");
	provider.fail_next(
		ProviderOperation::SignOut,
		auth_facade::provider::ProviderErrorCode::TooManyRequests,
	);

	assert_eq!(
		facade.sign_out().await,
		AuthResult::from(AuthFailure::rejected(ErrorKind::SignOutFailed, "Failed to sign out"))
	);
	assert!(facade.current_session().is_some());
	assert_eq!(facade.sign_out().await, AuthResult::success((), "Signed out successfully"));
	assert_eq!(facade.current_session(), None);
}

#[tokio::test]
async fn sessions_survive_a_restart() {
	let path = std::env::temp_dir().join(format!(
		"auth-facade-restart-{}-{}.json",
		std::process::id(),
		time::OffsetDateTime::now_utc().unix_timestamp_nanos()
	));
	let store: Arc<dyn SessionStore> =
		Arc::new(FileSessionStore::open(&path).expect("File store should open."));
	let provider = Arc::new(
		MemoryIdentityProvider::restore(store.clone())
			.await
			.expect("Restoring from an empty store should succeed."),
	);
	let facade: AuthFacade<MemoryIdentityProvider> = AuthFacade::new(provider.clone(), config(Platform::Web));
	let session = facade
		.register_with_password("ada@example.com", PASSWORD)
		.await
		.into_result()
		.expect("Registration should succeed.");

	drop(facade);

	let reopened: Arc<dyn SessionStore> =
		Arc::new(FileSessionStore::open(&path).expect("File store should reopen."));
	let restarted = AuthFacade::new(
		MemoryIdentityProvider::restore(reopened.clone())
			.await
			.expect("Restoring the persisted session should succeed."),
		config(Platform::Web),
	);
	let (seen, listener) = recorder();
	let _subscription = restarted.observe_session_changes(listener);

	assert_eq!(restarted.current_session(), Some(session));
	assert_eq!(*seen.lock(), vec![Some("ada@example.com".to_owned())]);

	restarted.sign_out().await.into_result().expect("Sign-out should succeed.");

	assert_eq!(reopened.load().await.expect("Store should load."), None);
	assert!(!path.exists());
}
