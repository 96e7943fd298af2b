#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use auth_facade::{
	auth::{FederatedProvider, ProviderId, Session, SessionTokens, TokenSecret, Uid},
	config::FacadeConfig,
	facade::AuthFacade,
	http::ReqwestHttpClient,
	outcome::{AuthFailure, ErrorKind},
	provider::{
		IdentityProvider, IdentityToolkitConfig, IdpCredential, PopupFuture, PopupHost,
		ProviderError, ProviderErrorCode, RestIdentityProvider,
	},
	store::{MemorySessionStore, SessionStore},
	url::Url,
};

const API_KEY: &str = "test-api-key";
const PASSWORD: &str = "hunter22";

struct ScriptedPopup(Result<IdpCredential, ProviderError>);
impl PopupHost for ScriptedPopup {
	fn authorize<'a>(&'a self, _provider: &'a FederatedProvider) -> PopupFuture<'a> {
		let outcome = self.0.clone();

		Box::pin(async move { outcome })
	}
}

fn toolkit_config(server: &MockServer) -> IdentityToolkitConfig {
	IdentityToolkitConfig::builder(API_KEY)
		.identity_endpoint(
			Url::parse(&server.url("/v1")).expect("Mock identity endpoint should parse."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token")).expect("Mock token endpoint should parse."),
		)
		.build()
		.expect("Loopback toolkit config should validate.")
}

// `httpmock` serves a self-signed certificate.
fn test_http_client() -> ReqwestHttpClient {
	let client = auth_facade::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

async fn build_provider(
	server: &MockServer,
	store: Arc<dyn SessionStore>,
	popup: Option<ScriptedPopup>,
) -> RestIdentityProvider {
	let mut builder = RestIdentityProvider::builder(toolkit_config(server))
		.http_client(test_http_client())
		.session_store(store);

	if let Some(popup) = popup {
		builder = builder.popup_host(Arc::new(popup));
	}

	builder.build().await.expect("REST provider should build.")
}

fn facade(provider: RestIdentityProvider) -> AuthFacade<RestIdentityProvider> {
	let config = FacadeConfig::builder()
		.request_timeout(None)
		.build()
		.expect("Facade config should build.");

	AuthFacade::new(provider, config)
}

fn auth_body(uid: &str, email: &str, id_token: &str) -> String {
	json!({
		"localId": uid,
		"email": email,
		"idToken": id_token,
		"refreshToken": format!("refresh-{uid}"),
		"expiresIn": "3600"
	})
	.to_string()
}

fn lookup_body(uid: &str, email: &str, providers: &[&str]) -> String {
	let infos = providers.iter().map(|p| json!({ "providerId": p })).collect::<Vec<_>>();

	json!({ "users": [{ "localId": uid, "email": email, "providerUserInfo": infos }] })
		.to_string()
}

fn error_body(message: &str) -> String {
	json!({ "error": { "code": 400, "message": message, "errors": [] } }).to_string()
}

#[tokio::test]
async fn password_sign_in_looks_up_linked_providers() {
	let server = MockServer::start_async().await;
	let sign_in = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/accounts:signInWithPassword")
				.query_param("key", API_KEY);
			then.status(200)
				.header("content-type", "application/json")
				.body(auth_body("uid-ada", "ada@example.com", "id-ada"));
		})
		.await;
	let lookup = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:lookup").query_param("key", API_KEY);
			then.status(200)
				.header("content-type", "application/json")
				.body(lookup_body("uid-ada", "ada@example.com", &["password", "google.com"]));
		})
		.await;
	let store = MemorySessionStore::default();
	let facade = facade(build_provider(&server, Arc::new(store.clone()), None).await);
	let result = facade.sign_in_with_password("ada@example.com", PASSWORD).await;

	sign_in.assert_async().await;
	lookup.assert_async().await;

	assert_eq!(result.message(), "Signed in successfully");

	let session = result.into_result().expect("Sign-in should succeed.");

	assert_eq!(session.uid.as_ref(), "uid-ada");
	assert!(session.has_password());
	assert!(session.has_provider(&ProviderId::google()));
	assert_eq!(
		session.tokens.as_ref().map(|tokens| tokens.id_token.expose()),
		Some("id-ada")
	);
	assert_eq!(facade.current_session(), Some(session.clone()));
	assert_eq!(store.snapshot(), Some(session));
}

#[tokio::test]
async fn server_error_codes_are_mapped() {
	let cases = [
		("EMAIL_NOT_FOUND", ErrorKind::InvalidCredential),
		("INVALID_PASSWORD", ErrorKind::InvalidCredential),
		("INVALID_LOGIN_CREDENTIALS", ErrorKind::InvalidCredential),
		("USER_DISABLED", ErrorKind::AccountDisabled),
		("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled", ErrorKind::RateLimited),
		("PASSWORD_LOGIN_DISABLED", ErrorKind::OperationNotAllowed),
		("QUOTA_EXCEEDED", ErrorKind::Unknown),
	];

	for (server_code, kind) in cases {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST).path("/v1/accounts:signInWithPassword");
				then.status(400)
					.header("content-type", "application/json")
					.body(error_body(server_code));
			})
			.await;
		let facade =
			facade(build_provider(&server, Arc::new(MemorySessionStore::default()), None).await);
		let result = facade.sign_in_with_password("ada@example.com", PASSWORD).await;

		mock.assert_async().await;

		assert_eq!(
			result.failure().and_then(AuthFailure::reason),
			Some(kind),
			"{server_code} should map to {kind}."
		);
		assert_eq!(facade.current_session(), None);
	}
}

#[tokio::test]
async fn weak_password_from_sign_up_uses_the_catalogue_message() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:signUp");
			then.status(400)
				.header("content-type", "application/json")
				.body(error_body("WEAK_PASSWORD : Password should be at least 6 characters"));
		})
		.await;
	let facade =
		facade(build_provider(&server, Arc::new(MemorySessionStore::default()), None).await);
	let result = facade.register_with_password("ada@example.com", PASSWORD).await;

	assert_eq!(
		result.failure(),
		Some(&AuthFailure::rejected(
			ErrorKind::WeakPassword,
			"Password must be at least 6 characters"
		))
	);
}

#[tokio::test]
async fn malformed_bodies_become_unknown_failures() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:signInWithPassword");
			then.status(200)
				.header("content-type", "application/json")
				.body(json!({ "localId": "uid-ada", "expiresIn": 3600 }).to_string());
		})
		.await;
	let facade =
		facade(build_provider(&server, Arc::new(MemorySessionStore::default()), None).await);
	let result = facade.sign_in_with_password("ada@example.com", PASSWORD).await;

	assert_eq!(result.failure().and_then(AuthFailure::reason), Some(ErrorKind::Unknown));
	assert!(result.message().starts_with("Malformed provider response"));
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
	// Nothing listens on port 1.
	let config = IdentityToolkitConfig::builder(API_KEY)
		.identity_endpoint(Url::parse("http://127.0.0.1:1/v1").expect("URL should parse."))
		.build()
		.expect("Loopback toolkit config should validate.");
	let provider = RestIdentityProvider::builder(config)
		.build()
		.await
		.expect("REST provider should build.");
	let result = facade(provider).sign_in_with_password("ada@example.com", PASSWORD).await;

	assert_eq!(
		result.failure(),
		Some(&AuthFailure::rejected(
			ErrorKind::NetworkError,
			"Connection error. Check your internet"
		))
	);
}

#[tokio::test]
async fn popup_sign_in_then_password_link() {
	let server = MockServer::start_async().await;
	let idp = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:signInWithIdp");
			then.status(200)
				.header("content-type", "application/json")
				.body(auth_body("uid-ada", "ada@example.com", "id-idp"));
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:update");
			then.status(200)
				.header("content-type", "application/json")
				.body(auth_body("uid-ada", "ada@example.com", "id-linked"));
		})
		.await;
	let lookup_federated = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:lookup").body_includes("id-idp");
			then.status(200)
				.header("content-type", "application/json")
				.body(lookup_body("uid-ada", "ada@example.com", &["google.com"]));
		})
		.await;
	let lookup_linked = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/accounts:lookup").body_includes("id-linked");
			then.status(200)
				.header("content-type", "application/json")
				.body(lookup_body("uid-ada", "ada@example.com", &["google.com", "password"]));
		})
		.await;
	let popup = ScriptedPopup(Ok(IdpCredential::IdToken(TokenSecret::new("google-id-token"))));
	let facade = facade(
		build_provider(&server, Arc::new(MemorySessionStore::default()), Some(popup)).await,
	);
	let federated = facade.sign_in_with_third_party().await;

	assert_eq!(federated.message(), "Signed in with Google successfully");

	let linked = facade.register_with_password("ada@example.com", PASSWORD).await;

	assert_eq!(linked.message(), "Password added to your account");
	assert_eq!(linked.value().map(|s| s.uid.as_ref()), Some("uid-ada"));
	assert!(linked.value().is_some_and(Session::has_password));

	idp.assert_async().await;
	update.assert_async().await;
	lookup_federated.assert_async().await;
	lookup_linked.assert_async().await;
}

#[tokio::test]
async fn popup_dismissal_is_a_cancellation() {
	let server = MockServer::start_async().await;
	let popup = ScriptedPopup(Err(ProviderError::new(ProviderErrorCode::PopupClosedByUser)));
	let facade = facade(
		build_provider(&server, Arc::new(MemorySessionStore::default()), Some(popup)).await,
	);
	let result = facade.sign_in_with_third_party().await;

	assert!(result.is_cancelled());
	assert_eq!(result.message(), "");
}

fn persisted_session(expires_in: time::Duration) -> Session {
	Session::new(Uid::new("uid-ada").expect("Uid fixture should be valid."))
		.with_email("ada@example.com")
		.with_provider(ProviderId::password())
		.with_tokens(SessionTokens {
			id_token: TokenSecret::new("id-old"),
			refresh_token: TokenSecret::new("refresh-old"),
			expires_at: time::OffsetDateTime::now_utc() + expires_in,
		})
}

#[tokio::test]
async fn restored_sessions_refresh_and_notify() {
	let server = MockServer::start_async().await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").query_param("key", API_KEY);
			then.status(200).header("content-type", "application/json").body(
				json!({
					"id_token": "id-new",
					"refresh_token": "refresh-new",
					"expires_in": "3600",
					"token_type": "Bearer",
					"user_id": "uid-ada"
				})
				.to_string(),
			);
		})
		.await;
	let store = MemorySessionStore::default();

	store
		.save(persisted_session(time::Duration::seconds(30)))
		.await
		.expect("Seeding the store should succeed.");

	let provider = build_provider(&server, Arc::new(store.clone()), None).await;
	let notified = Arc::new(parking_lot::Mutex::new(Vec::new()));
	let sink = notified.clone();
	let _subscription = provider.session_state().subscribe(move |session: Option<&Session>| {
		sink.lock().push(
			session.and_then(|s| s.tokens.as_ref()).map(|t| t.id_token.expose().to_owned()),
		);
	});

	assert!(provider.current_session().is_some());

	let untouched = provider
		.refresh_session_if_needed(time::Duration::seconds(10))
		.await
		.expect("A fresh session should not need a refresh.");

	assert_eq!(
		untouched.and_then(|s| s.tokens).map(|t| t.id_token),
		Some(TokenSecret::new("id-old"))
	);

	let refreshed = provider
		.refresh_session_if_needed(time::Duration::minutes(5))
		.await
		.expect("Refresh should succeed.")
		.expect("A session should be signed in.");

	refresh.assert_calls_async(1).await;

	assert_eq!(refreshed.tokens.as_ref().map(|t| t.refresh_token.expose()), Some("refresh-new"));
	assert_eq!(store.snapshot(), Some(refreshed));
	assert_eq!(*notified.lock(), vec![Some("id-old".to_owned()), Some("id-new".to_owned())]);
}

#[tokio::test]
async fn rejected_refresh_tokens_sign_the_session_out() {
	let server = MockServer::start_async().await;
	let _refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(error_body("TOKEN_EXPIRED"));
		})
		.await;
	let store = MemorySessionStore::default();

	store
		.save(persisted_session(time::Duration::seconds(-5)))
		.await
		.expect("Seeding the store should succeed.");

	let provider = build_provider(&server, Arc::new(store.clone()), None).await;
	let err = provider.refresh_session().await.expect_err("Expired refresh tokens should fail.");

	assert_eq!(err.code, ProviderErrorCode::Other("user-token-expired".into()));
	assert_eq!(provider.current_session(), None);
	assert_eq!(store.snapshot(), None);
}

#[tokio::test]
async fn transient_refresh_failures_keep_the_session() {
	let server = MockServer::start_async().await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(503);
		})
		.await;
	let store = MemorySessionStore::default();
	let seeded = persisted_session(time::Duration::seconds(-5));

	store.save(seeded.clone()).await.expect("Seeding the store should succeed.");

	let provider = build_provider(&server, Arc::new(store.clone()), None).await;
	let err = provider.refresh_session().await.expect_err("A 503 should fail the refresh.");

	refresh.assert_calls_async(1).await;

	assert_eq!(err.code, ProviderErrorCode::Other("internal-error".into()));
	assert_eq!(provider.current_session(), Some(seeded.clone()));
	assert_eq!(store.snapshot(), Some(seeded));
}

#[tokio::test]
async fn sign_out_during_a_refresh_stays_signed_out() {
	let server = MockServer::start_async().await;
	let _refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(300))
				.body(
					json!({
						"id_token": "id-new",
						"refresh_token": "refresh-new",
						"expires_in": "3600",
						"user_id": "uid-ada"
					})
					.to_string(),
				);
		})
		.await;
	let store = MemorySessionStore::default();

	store
		.save(persisted_session(time::Duration::seconds(30)))
		.await
		.expect("Seeding the store should succeed.");

	let provider = Arc::new(build_provider(&server, Arc::new(store.clone()), None).await);
	let facade: AuthFacade<RestIdentityProvider> = AuthFacade::new(
		provider.clone(),
		FacadeConfig::builder().request_timeout(None).build().expect("Facade config should build."),
	);
	let notified = Arc::new(parking_lot::Mutex::new(Vec::new()));
	let sink = notified.clone();
	let _subscription = facade.observe_session_changes(move |session: Option<&Session>| {
		sink.lock().push(
			session.and_then(|s| s.tokens.as_ref()).map(|t| t.id_token.expose().to_owned()),
		);
	});
	let (refreshed, signed_out) = tokio::join!(provider.refresh_session(), async {
		tokio::time::sleep(std::time::Duration::from_millis(50)).await;

		facade.sign_out().await
	});

	assert!(refreshed.is_ok());
	assert!(signed_out.is_success());
	assert_eq!(facade.current_session(), None);
	assert_eq!(store.snapshot(), None);
	assert_eq!(notified.lock().last(), Some(&None));
}

#[tokio::test]
async fn sign_out_is_local() {
	let server = MockServer::start_async().await;
	let store = MemorySessionStore::default();

	store
		.save(persisted_session(time::Duration::hours(1)))
		.await
		.expect("Seeding the store should succeed.");

	let facade = facade(build_provider(&server, Arc::new(store.clone()), None).await);

	assert!(facade.current_session().is_some());
	assert!(facade.sign_out().await.is_success());
	assert_eq!(facade.current_session(), None);
	assert_eq!(store.snapshot(), None);
}
