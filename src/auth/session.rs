//! Provider-issued session records and the federated sign-in providers they can link.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenSecret, Uid},
};

/// Provider tokens attached to a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
	/// Short-lived id token proving the session to the provider.
	pub id_token: TokenSecret,
	/// Long-lived token used to mint new id tokens.
	pub refresh_token: TokenSecret,
	/// Instant the id token stops being accepted.
	pub expires_at: OffsetDateTime,
}

/// Authenticated principal as reported by the identity provider.
///
/// The facade only reads sessions; providers create, persist, and destroy them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Provider-assigned account identifier.
	pub uid: Uid,
	/// Email address, when the account has one.
	pub email: Option<String>,
	/// Display name, when the account has one.
	pub display_name: Option<String>,
	/// Sign-in methods linked to the account.
	pub providers: Vec<ProviderId>,
	/// Provider tokens, for providers that hand them to the client.
	pub tokens: Option<SessionTokens>,
}
impl Session {
	/// Creates a session with no email, display name, providers, or tokens.
	pub fn new(uid: Uid) -> Self {
		Self { uid, email: None, display_name: None, providers: Vec::new(), tokens: None }
	}

	/// Sets the email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Sets the display name.
	pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
		self.display_name = Some(name.into());

		self
	}

	/// Adds a linked sign-in method, ignoring duplicates.
	pub fn with_provider(mut self, provider: ProviderId) -> Self {
		self.link(provider);

		self
	}

	/// Attaches provider tokens.
	pub fn with_tokens(mut self, tokens: SessionTokens) -> Self {
		self.tokens = Some(tokens);

		self
	}

	/// Records a linked sign-in method, ignoring duplicates.
	pub fn link(&mut self, provider: ProviderId) {
		if !self.providers.contains(&provider) {
			self.providers.push(provider);
		}
	}

	/// Returns `true` if the sign-in method is linked.
	pub fn has_provider(&self, provider: &ProviderId) -> bool {
		self.providers.contains(provider)
	}

	/// Returns `true` if an email + password credential is linked.
	pub fn has_password(&self) -> bool {
		self.providers.iter().any(ProviderId::is_password)
	}

	/// Returns `true` when the session email matches `email`, ignoring ASCII case and
	/// surrounding whitespace.
	pub fn email_matches(&self, email: &str) -> bool {
		self.email.as_deref().is_some_and(|own| own.trim().eq_ignore_ascii_case(email.trim()))
	}

	/// Returns `true` when the session tokens expire within `window` of `now`.
	///
	/// Sessions without tokens never need a refresh.
	pub fn needs_refresh(&self, now: OffsetDateTime, window: Duration) -> bool {
		let Some(tokens) = self.tokens.as_ref() else {
			return false;
		};
		let window = if window.is_negative() { Duration::ZERO } else { window };

		tokens.expires_at - now <= window
	}
}

/// Federated identity provider offered through an interactive popup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedProvider {
	/// Sign-in method identifier linked on success.
	pub id: ProviderId,
	/// Human-readable name used in success messages.
	pub display_name: String,
}
impl FederatedProvider {
	/// Creates a federated provider description.
	pub fn new(id: ProviderId, display_name: impl Into<String>) -> Self {
		Self { id, display_name: display_name.into() }
	}

	/// Google sign-in.
	pub fn google() -> Self {
		Self::new(ProviderId::google(), "Google")
	}
}
impl Default for FederatedProvider {
	fn default() -> Self {
		Self::google()
	}
}
