//! Identity-provider seam consumed by the facade, plus the built-in provider clients.
//!
//! [`IdentityProvider`] is the only thing the facade knows about authentication backends.
//! Implementations own session persistence and token refresh, and publish every session
//! transition through their [`SessionState`].
//!
//! - [`MemoryIdentityProvider`] keeps accounts in-process for tests and demos.
//! - `RestIdentityProvider` (feature `reqwest`) talks to the Identity Toolkit REST API.

pub mod error;
pub mod memory;
pub mod popup;
#[cfg(feature = "reqwest")] pub mod rest;

pub use error::*;
pub use memory::MemoryIdentityProvider;
pub use popup::*;
#[cfg(feature = "reqwest")] pub use rest::*;

// self
use crate::{
	_prelude::*,
	auth::{FederatedProvider, Password, Session},
	session::SessionState,
};

/// Boxed future returned by [`IdentityProvider`] operations.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Operations a managed identity service must expose to back the facade.
///
/// Successful sign-in, account creation, and linking must leave the resulting session in
/// [`session_state`](Self::session_state) (which notifies listeners); sign-out must clear it.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Signs in with an email + password credential.
	fn sign_in_with_password<'a>(
		&'a self,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session>;

	/// Creates a new password account and signs it in.
	fn create_account<'a>(
		&'a self,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session>;

	/// Attaches a password credential to the signed-in `session` without creating an account.
	fn link_password<'a>(
		&'a self,
		session: &'a Session,
		email: &'a str,
		password: &'a Password,
	) -> ProviderFuture<'a, Session>;

	/// Runs the interactive popup flow for `provider` and signs the resulting account in.
	fn sign_in_with_popup<'a>(
		&'a self,
		provider: &'a FederatedProvider,
	) -> ProviderFuture<'a, Session>;

	/// Signs the current session out.
	fn sign_out(&self) -> ProviderFuture<'_, ()>;

	/// Cached session cell and change channel.
	fn session_state(&self) -> &SessionState;

	/// Cached session; never blocks and never touches the network.
	fn current_session(&self) -> Option<Session> {
		self.session_state().current()
	}
}
