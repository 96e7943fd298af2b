//! In-process [`IdentityProvider`] for tests, demos, and offline development.
//!
//! Accounts live in memory keyed by normalized email, passwords are kept as salted SHA-256
//! digests, and tokens are random opaque strings. Validation mirrors what the managed service
//! enforces (malformed email, short password, disabled account) so facade behavior can be
//! exercised end to end. Tests can also script popup outcomes, queue failures per
//! operation, add latency, and read per-operation call counters.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, RngCore, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{FederatedProvider, Password, ProviderId, Session, SessionTokens, TokenSecret, Uid},
	obs,
	provider::{IdentityProvider, ProviderError, ProviderErrorCode, ProviderFuture},
	session::SessionState,
	store::{SessionStore, StoreError},
};

const UID_LEN: usize = 28;
const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL: Duration = Duration::hours(1);

/// Provider operations tracked by [`MemoryIdentityProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
	/// [`IdentityProvider::sign_in_with_password`].
	SignInWithPassword,
	/// [`IdentityProvider::create_account`].
	CreateAccount,
	/// [`IdentityProvider::link_password`].
	LinkPassword,
	/// [`IdentityProvider::sign_in_with_popup`].
	SignInWithPopup,
	/// [`IdentityProvider::sign_out`].
	SignOut,
}
impl ProviderOperation {
	const ALL: [Self; 5] = [
		Self::SignInWithPassword,
		Self::CreateAccount,
		Self::LinkPassword,
		Self::SignInWithPopup,
		Self::SignOut,
	];

	const fn index(self) -> usize {
		match self {
			Self::SignInWithPassword => 0,
			Self::CreateAccount => 1,
			Self::LinkPassword => 2,
			Self::SignInWithPopup => 3,
			Self::SignOut => 4,
		}
	}
}

/// Scripted result of the next popup sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PopupOutcome {
	/// The user completed the popup as this federated identity.
	Identity {
		/// Email reported by the federated provider.
		email: String,
		/// Display name reported by the federated provider.
		display_name: Option<String>,
	},
	/// The popup failed with this error (e.g. `popup-closed-by-user`).
	Error(ProviderError),
}
impl PopupOutcome {
	/// Completed popup for `email`.
	pub fn identity(email: impl Into<String>) -> Self {
		Self::Identity { email: email.into(), display_name: None }
	}

	/// The user closed the popup.
	pub fn closed_by_user() -> Self {
		Self::Error(ProviderError::new(ProviderErrorCode::PopupClosedByUser))
	}
}

/// In-memory identity provider.
#[derive(Default)]
pub struct MemoryIdentityProvider {
	accounts: RwLock<HashMap<String, Account>>,
	popups: Mutex<VecDeque<PopupOutcome>>,
	failures: Mutex<HashMap<ProviderOperation, VecDeque<ProviderError>>>,
	calls: [AtomicUsize; 5],
	latency: Mutex<Option<StdDuration>>,
	store: Option<Arc<dyn SessionStore>>,
	state: SessionState,
}
impl MemoryIdentityProvider {
	/// Creates a provider that persists its session in `store` and restores whatever the store
	/// already holds.
	pub async fn restore(store: Arc<dyn SessionStore>) -> Result<Self, StoreError> {
		let persisted = store.load().await?;

		if let Some(session) = persisted.as_ref() {
			obs::record_event("memory_provider.restore", &session.uid);
		}

		Ok(Self {
			store: Some(store),
			state: SessionState::with_session(persisted),
			..Default::default()
		})
	}

	/// Seeds a password account and returns its uid.
	pub fn add_password_account(&self, email: &str, password: &str) -> Uid {
		let mut account = Account::new(email);

		account.password = Some(PasswordDigest::new(password));
		account.providers.push(ProviderId::password());

		let uid = account.uid.clone();

		self.accounts.write().insert(normalize_email(email), account);

		uid
	}

	/// Seeds an account that only has `provider` linked (no password) and returns its uid.
	pub fn add_federated_account(&self, email: &str, provider: &FederatedProvider) -> Uid {
		let mut account = Account::new(email);

		account.providers.push(provider.id.clone());

		let uid = account.uid.clone();

		self.accounts.write().insert(normalize_email(email), account);

		uid
	}

	/// Marks the account disabled; returns `false` if no such account exists.
	pub fn disable_account(&self, email: &str) -> bool {
		match self.accounts.write().get_mut(&normalize_email(email)) {
			Some(account) => {
				account.disabled = true;

				true
			},
			None => false,
		}
	}

	/// Number of accounts known to the provider.
	pub fn account_count(&self) -> usize {
		self.accounts.read().len()
	}

	/// Queues the outcome of the next popup sign-in.
	pub fn script_popup(&self, outcome: PopupOutcome) {
		self.popups.lock().push_back(outcome);
	}

	/// Makes the next call to `operation` fail with `error` before touching any account.
	pub fn fail_next(&self, operation: ProviderOperation, error: impl Into<ProviderError>) {
		self.failures.lock().entry(operation).or_default().push_back(error.into());
	}

	/// Delays every subsequent operation by `latency` (requires a Tokio runtime).
	pub fn set_latency(&self, latency: Option<StdDuration>) {
		*self.latency.lock() = latency;
	}

	/// Number of times `operation` has been invoked.
	pub fn calls(&self, operation: ProviderOperation) -> usize {
		self.calls[operation.index()].load(Ordering::SeqCst)
	}

	/// Number of invocations across every operation.
	pub fn total_calls(&self) -> usize {
		ProviderOperation::ALL.iter().map(|op| self.calls(*op)).sum()
	}

	/// Mints fresh tokens for the current session, as a background token refresh would.
	pub async fn refresh_tokens(&self) -> Option<Session> {
		let mut session = self.state.current()?;

		session.tokens = Some(mint_tokens());
		self.establish(session.clone()).await;

		Some(session)
	}

	/// Ends the current session from the provider side, as a server revocation would.
	pub async fn revoke_session(&self) -> Option<Session> {
		let previous = self.state.current();

		if let Err(e) = self.forget().await {
			obs::record_warning("memory_provider.revoke", &e);
		}

		previous
	}

	async fn begin(&self, operation: ProviderOperation) -> Result<(), ProviderError> {
		self.calls[operation.index()].fetch_add(1, Ordering::SeqCst);

		let latency = *self.latency.lock();

		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}

		let injected =
			self.failures.lock().get_mut(&operation).and_then(|queue| queue.pop_front());

		match injected {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}

	async fn establish(&self, session: Session) {
		if let Some(store) = self.store.as_ref() {
			if let Err(e) = store.save(session.clone()).await {
				obs::record_warning("memory_provider.persist", &e);
			}
		}

		self.state.replace(Some(session));
	}

	async fn forget(&self) -> Result<(), StoreError> {
		let cleared = match self.store.as_ref() {
			Some(store) => store.clear().await.map(|_| ()),
			None => Ok(()),
		};

		self.state.replace(None);

		cleared
	}

	fn sign_in_now(&self, email: &str, password: &Password) -> Result<Session, ProviderError> {
		validate_email(email)?;

		let accounts = self.accounts.read();
		let account = accounts
			.get(&normalize_email(email))
			.ok_or_else(|| ProviderError::new(ProviderErrorCode::UserNotFound))?;

		if account.disabled {
			return Err(ProviderErrorCode::UserDisabled.into());
		}

		match account.password.as_ref() {
			Some(digest) if digest.verify(password.expose()) => Ok(account.session()),
			Some(_) => Err(ProviderErrorCode::WrongPassword.into()),
			None => Err(ProviderErrorCode::InvalidCredential.into()),
		}
	}

	fn create_now(&self, email: &str, password: &Password) -> Result<Session, ProviderError> {
		validate_email(email)?;
		validate_password(password)?;

		let mut accounts = self.accounts.write();
		let key = normalize_email(email);

		if accounts.contains_key(&key) {
			return Err(ProviderErrorCode::EmailAlreadyInUse.into());
		}

		let mut account = Account::new(email);

		account.password = Some(PasswordDigest::new(password.expose()));
		account.providers.push(ProviderId::password());

		let session = account.session();

		accounts.insert(key, account);

		Ok(session)
	}

	fn link_now(
		&self,
		session: &Session,
		email: &str,
		password: &Password,
	) -> Result<Session, ProviderError> {
		validate_email(email)?;
		validate_password(password)?;

		if self.state.current().is_none_or(|current| current.uid != session.uid) {
			return Err(ProviderError::new(ProviderErrorCode::Other("user-mismatch".into()))
				.with_message("The session is not the signed-in user."));
		}

		let mut accounts = self.accounts.write();
		let key = normalize_email(email);

		if accounts.get(&key).is_some_and(|owner| owner.uid != session.uid) {
			return Err(ProviderErrorCode::EmailAlreadyInUse.into());
		}

		let current_key = accounts
			.iter()
			.find(|(_, account)| account.uid == session.uid)
			.map(|(key, _)| key.clone())
			.ok_or_else(|| ProviderError::new(ProviderErrorCode::UserNotFound))?;
		let mut account = accounts
			.remove(&current_key)
			.ok_or_else(|| ProviderError::new(ProviderErrorCode::UserNotFound))?;

		if account.password.is_some() {
			accounts.insert(current_key, account);

			return Err(ProviderErrorCode::ProviderAlreadyLinked.into());
		}

		account.email = email.trim().to_owned();
		account.password = Some(PasswordDigest::new(password.expose()));
		account.providers.push(ProviderId::password());

		let session = account.session();

		accounts.insert(key, account);

		Ok(session)
	}

	fn popup_now(&self, provider: &FederatedProvider) -> Result<Session, ProviderError> {
		let outcome = self.popups.lock().pop_front().ok_or_else(|| {
			ProviderError::new(ProviderErrorCode::OperationNotAllowed)
				.with_message("No popup outcome was scripted.")
		})?;
		let (email, display_name) = match outcome {
			PopupOutcome::Identity { email, display_name } => (email, display_name),
			PopupOutcome::Error(error) => return Err(error),
		};
		let mut accounts = self.accounts.write();
		let account =
			accounts.entry(normalize_email(&email)).or_insert_with(|| Account::new(&email));

		if account.disabled {
			return Err(ProviderErrorCode::UserDisabled.into());
		}
		if !account.providers.contains(&provider.id) {
			account.providers.push(provider.id.clone());
		}
		if account.display_name.is_none() {
			account.display_name = display_name;
		}

		Ok(account.session())
	}
}
impl Debug for MemoryIdentityProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryIdentityProvider")
			.field("accounts", &self.account_count())
			.field("persistent", &self.store.is_some())
			.field("state", &self.state)
			.finish()
	}
}
impl IdentityProvider for MemoryIdentityProvider {
	fn sign_in_with_password<'a>(
		&'a self,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			self.begin(ProviderOperation::SignInWithPassword).await?;

			let session = self.sign_in_now(email, password)?;

			self.establish(session.clone()).await;

			Ok(session)
		})
	}

	fn create_account<'a>(
		&'a self,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			self.begin(ProviderOperation::CreateAccount).await?;

			let session = self.create_now(email, password)?;

			self.establish(session.clone()).await;

			Ok(session)
		})
	}

	fn link_password<'a>(
		&'a self,
		session: &'a Session,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			self.begin(ProviderOperation::LinkPassword).await?;

			let linked = self.link_now(session, email, password)?;

			self.establish(linked.clone()).await;

			Ok(linked)
		})
	}

	fn sign_in_with_popup<'a>(
		&'a self,
		provider: &'a FederatedProvider,
	) -> ProviderFuture<'a, Session> {
		Box::pin(async move {
			self.begin(ProviderOperation::SignInWithPopup).await?;

			let session = self.popup_now(provider)?;

			self.establish(session.clone()).await;

			Ok(session)
		})
	}

	fn sign_out(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			self.begin(ProviderOperation::SignOut).await?;
			self.forget().await.map_err(|e| ProviderError::from(Error::from(e)))
		})
	}

	fn session_state(&self) -> &SessionState {
		&self.state
	}
}

struct Account {
	uid: Uid,
	email: String,
	display_name: Option<String>,
	password: Option<PasswordDigest>,
	providers: Vec<ProviderId>,
	disabled: bool,
}
impl Account {
	fn new(email: &str) -> Self {
		Self {
			uid: mint_uid(),
			email: email.trim().to_owned(),
			display_name: None,
			password: None,
			providers: Vec::new(),
			disabled: false,
		}
	}

	fn session(&self) -> Session {
		let mut session = Session::new(self.uid.clone()).with_email(&self.email);

		session.display_name = self.display_name.clone();
		session.providers = self.providers.clone();
		session.tokens = Some(mint_tokens());

		session
	}
}

struct PasswordDigest {
	salt: [u8; 16],
	digest: String,
}
impl PasswordDigest {
	fn new(password: &str) -> Self {
		let mut salt = [0_u8; 16];

		rand::rng().fill_bytes(&mut salt);

		let digest = Self::hash(&salt, password);

		Self { salt, digest }
	}

	fn verify(&self, password: &str) -> bool {
		Self::hash(&self.salt, password) == self.digest
	}

	fn hash(salt: &[u8], password: &str) -> String {
		let mut hasher = Sha256::new();

		hasher.update(salt);
		hasher.update(password.as_bytes());

		URL_SAFE_NO_PAD.encode(hasher.finalize())
	}
}

fn normalize_email(email: &str) -> String {
	email.trim().to_ascii_lowercase()
}

fn validate_email(email: &str) -> Result<(), ProviderError> {
	let email = email.trim();
	let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
		!local.is_empty() && domain.contains('.') && !domain.contains('@')
	});
	let valid = well_formed && !email.chars().any(char::is_whitespace);

	if valid { Ok(()) } else { Err(ProviderErrorCode::InvalidEmail.into()) }
}

fn validate_password(password: &Password) -> Result<(), ProviderError> {
	if password.char_len() < MIN_PASSWORD_LEN {
		Err(ProviderError::new(ProviderErrorCode::WeakPassword)
			.with_message("Password should be at least 6 characters."))
	} else {
		Ok(())
	}
}

fn mint_uid() -> Uid {
	let raw: String =
		rand::rng().sample_iter(&Alphanumeric).take(UID_LEN).map(char::from).collect();

	// Alphanumeric output is never empty, whitespace-free, and shorter than the id limit.
	Uid::new(raw).unwrap_or_else(|_| unreachable!("generated uids are always valid"))
}

fn mint_token() -> TokenSecret {
	let mut bytes = [0_u8; 32];

	rand::rng().fill_bytes(&mut bytes);

	TokenSecret::new(URL_SAFE_NO_PAD.encode(bytes))
}

fn mint_tokens() -> SessionTokens {
	SessionTokens {
		id_token: mint_token(),
		refresh_token: mint_token(),
		expires_at: OffsetDateTime::now_utc() + TOKEN_TTL,
	}
}
