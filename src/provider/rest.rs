//! Identity Toolkit REST client.
//!
//! [`RestIdentityProvider`] implements [`IdentityProvider`] over the `accounts:*` endpoints
//! and the secure-token refresh endpoint. After every token-bearing call it looks the account
//! up (`accounts:lookup`) to learn the linked sign-in methods, then publishes the resulting
//! session through its [`SessionState`] and persists it in the configured [`SessionStore`].
//! Sign-out is local: the session is dropped from state and store.
//!
//! Every session write (sign-in, link, refresh, sign-out) happens under one async guard, so a
//! refresh still in flight cannot publish a session after a sign-out has cleared it.

mod config;
mod wire;

pub use config::*;

// self
use crate::{
	_prelude::*,
	auth::{FederatedProvider, Password, Session},
	error::TransportError,
	http::{HttpReply, ReqwestHttpClient},
	obs,
	provider::{
		IdentityProvider, NoPopupHost, PopupHost, ProviderError, ProviderErrorCode, ProviderFuture,
	},
	session::SessionState,
	store::{MemorySessionStore, SessionStore},
};
use wire::{
	AuthReply, ErrorEnvelope, IdpRequest, LinkPasswordRequest, LookupReply, LookupRequest,
	PasswordRequest, RefreshReply,
};

const SIGN_IN_WITH_PASSWORD: &str = "accounts:signInWithPassword";
const SIGN_UP: &str = "accounts:signUp";
const UPDATE: &str = "accounts:update";
const SIGN_IN_WITH_IDP: &str = "accounts:signInWithIdp";
const LOOKUP: &str = "accounts:lookup";

/// Identity provider backed by the Identity Toolkit REST API.
pub struct RestIdentityProvider {
	config: IdentityToolkitConfig,
	http: ReqwestHttpClient,
	popup: Arc<dyn PopupHost>,
	store: Arc<dyn SessionStore>,
	state: SessionState,
	session_guard: AsyncMutex<()>,
}
impl RestIdentityProvider {
	/// Starts a builder for `config`.
	pub fn builder(config: IdentityToolkitConfig) -> RestIdentityProviderBuilder {
		RestIdentityProviderBuilder::new(config)
	}

	/// Project configuration.
	pub fn config(&self) -> &IdentityToolkitConfig {
		&self.config
	}

	/// Exchanges the session's refresh token for fresh tokens and publishes the new session.
	///
	/// Returns `Ok(None)` when nobody is signed in. A rejected refresh token
	/// (`TOKEN_EXPIRED`, `USER_DISABLED`, `USER_NOT_FOUND`, `INVALID_REFRESH_TOKEN`) signs the
	/// session out before the error is returned; other failures keep the session.
	pub async fn refresh_session(&self) -> Result<Option<Session>, ProviderError> {
		let _singleflight = self.session_guard.lock().await;

		self.refresh_locked().await
	}

	/// Refreshes only when the id token expires within `window`.
	pub async fn refresh_session_if_needed(
		&self,
		window: Duration,
	) -> Result<Option<Session>, ProviderError> {
		let _singleflight = self.session_guard.lock().await;
		let Some(current) = self.state.current() else {
			return Ok(None);
		};

		if !current.needs_refresh(OffsetDateTime::now_utc(), window) {
			return Ok(Some(current));
		}

		self.refresh_locked().await
	}

	async fn refresh_locked(&self) -> Result<Option<Session>, ProviderError> {
		let Some(current) = self.state.current() else {
			return Ok(None);
		};
		let Some(tokens) = current.tokens.as_ref() else {
			return Ok(Some(current));
		};
		let reply = self
			.http
			.post_form(self.config.token_url(), &[
				("grant_type", "refresh_token"),
				("refresh_token", tokens.refresh_token.expose()),
			])
			.await
			.map_err(Error::from)?;
		let refreshed = match decode::<RefreshReply>(reply) {
			Ok(refreshed) => refreshed,
			Err(e) => {
				if e.code.revokes_session() {
					obs::record_warning("rest_provider.refresh", &e);
					self.forget().await?;
				}

				return Err(e);
			},
		};

		if refreshed.user_id != current.uid.as_ref() {
			return Err(ProviderError::new(ProviderErrorCode::Other("user-mismatch".into()))
				.with_message("Refreshed tokens belong to another user."));
		}

		let mut session = current;

		session.tokens = Some(refreshed.tokens(OffsetDateTime::now_utc())?);
		self.establish(session.clone()).await;

		Ok(Some(session))
	}

	async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, ProviderError>
	where
		B: Serialize,
		T: for<'de> Deserialize<'de>,
	{
		let url = self.config.method_url(method).map_err(Error::from)?;
		let reply = self.http.post_json(url, body).await.map_err(Error::from)?;

		decode(reply)
	}

	/// Looks the account up and publishes it as the current session.
	async fn complete(&self, auth: AuthReply) -> Result<Session, ProviderError> {
		let tokens = auth.tokens(OffsetDateTime::now_utc())?;
		let lookup: LookupReply =
			self.call(LOOKUP, &LookupRequest { id_token: &auth.id_token }).await?;
		let uid = auth.uid()?;
		let account = lookup
			.users
			.into_iter()
			.find(|user| user.local_id == uid.as_ref())
			.ok_or_else(|| ProviderError::new(ProviderErrorCode::UserNotFound))?;

		if account.disabled {
			return Err(ProviderErrorCode::UserDisabled.into());
		}

		let mut session = account.into_session(tokens)?;

		if session.email.is_none() {
			session.email = auth.email;
		}
		if session.display_name.is_none() {
			session.display_name = auth.display_name;
		}

		let _write = self.session_guard.lock().await;

		self.establish(session.clone()).await;

		Ok(session)
	}

	async fn establish(&self, session: Session) {
		if let Err(e) = self.store.save(session.clone()).await {
			obs::record_warning("rest_provider.persist", &e);
		}

		self.state.replace(Some(session));
	}

	async fn forget(&self) -> Result<(), ProviderError> {
		let cleared = self.store.clear().await;

		self.state.replace(None);
		cleared.map(|_| ()).map_err(|e| Error::from(e).into())
	}
}
impl Debug for RestIdentityProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RestIdentityProvider")
			.field("identity_endpoint", &self.config.identity_endpoint.as_str())
			.field("state", &self.state)
			.finish()
	}
}
impl IdentityProvider for RestIdentityProvider {
	fn sign_in_with_password<'a>(
		&'a self,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			let body = PasswordRequest {
				email: email.trim(),
				password: password.expose(),
				return_secure_token: true,
			};
			let auth = self.call(SIGN_IN_WITH_PASSWORD, &body).await?;

			self.complete(auth).await
		})
	}

	fn create_account<'a>(
		&'a self,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			let body = PasswordRequest {
				email: email.trim(),
				password: password.expose(),
				return_secure_token: true,
			};
			let auth = self.call(SIGN_UP, &body).await?;

			self.complete(auth).await
		})
	}

	fn link_password<'a>(
		&'a self,
		session: &'a Session,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			let id_token = session.tokens.as_ref().map(|t| t.id_token.expose()).ok_or_else(|| {
				ProviderError::new(ProviderErrorCode::Other("user-token-expired".into()))
					.with_message("The session carries no id token.")
			})?;
			let body = LinkPasswordRequest {
				id_token,
				email: email.trim(),
				password: password.expose(),
				return_secure_token: true,
			};
			let auth = self.call(UPDATE, &body).await?;

			self.complete(auth).await
		})
	}

	fn sign_in_with_popup<'a>(
		&'a self,
		provider: &'a FederatedProvider,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			let credential = self.popup.authorize(provider).await?;
			let post_body = credential.post_body(provider);
			let body = IdpRequest {
				post_body: &post_body,
				request_uri: self.config.request_uri.as_str(),
				return_idp_credential: true,
				return_secure_token: true,
			};
			let auth = self.call(SIGN_IN_WITH_IDP, &body).await?;

			self.complete(auth).await
		})
	}

	fn sign_out(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			let _write = self.session_guard.lock().await;

			self.forget().await
		})
	}

	fn session_state(&self) -> &SessionState {
		&self.state
	}
}

/// Builder for [`RestIdentityProvider`].
pub struct RestIdentityProviderBuilder {
	config: IdentityToolkitConfig,
	http: Option<ReqwestHttpClient>,
	popup: Arc<dyn PopupHost>,
	store: Arc<dyn SessionStore>,
}
impl RestIdentityProviderBuilder {
	/// Creates a builder with an in-memory store and no popup host.
	pub fn new(config: IdentityToolkitConfig) -> Self {
		Self {
			config,
			http: None,
			popup: Arc::new(NoPopupHost),
			store: Arc::new(MemorySessionStore::default()),
		}
	}

	/// Reuses an existing HTTP client.
	pub fn http_client(mut self, client: ReqwestHttpClient) -> Self {
		self.http = Some(client);

		self
	}

	/// Sets the host that runs federated popups.
	pub fn popup_host(mut self, host: Arc<dyn PopupHost>) -> Self {
		self.popup = host;

		self
	}

	/// Sets the store the session is persisted in.
	pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
		self.store = store;

		self
	}

	/// Builds the provider and restores whatever session the store holds.
	pub async fn build(self) -> Result<RestIdentityProvider> {
		let http = match self.http {
			Some(http) => http,
			None => ReqwestHttpClient::with_client(
				ReqwestClient::builder()
					.redirect(reqwest::redirect::Policy::none())
					.build()
					.map_err(crate::error::ConfigError::from)?,
			),
		};
		let persisted = self.store.load().await?;

		if let Some(session) = persisted.as_ref() {
			obs::record_event("rest_provider.restore", &session.uid);
		}

		Ok(RestIdentityProvider {
			config: self.config,
			http,
			popup: self.popup,
			store: self.store,
			state: SessionState::with_session(persisted),
			session_guard: AsyncMutex::new(()),
		})
	}
}

/// Decodes a success body as `T` or an error envelope as a [`ProviderError`].
fn decode<T>(reply: HttpReply) -> Result<T, ProviderError>
where
	T: for<'de> Deserialize<'de>,
{
	if reply.is_success() {
		return reply.json::<T>().map_err(|e| Error::from(e).into());
	}

	match reply.json::<ErrorEnvelope>() {
		Ok(envelope) => Err(envelope.error.into_provider_error()),
		Err(TransportError::ResponseParse { status, .. }) =>
			Err(ProviderError::new(ProviderErrorCode::Other("internal-error".into()))
				.with_message(format!(
					"Identity provider returned status {} without an error body.",
					status.unwrap_or(reply.status)
				))),
		Err(e) => Err(Error::from(e).into()),
	}
}
