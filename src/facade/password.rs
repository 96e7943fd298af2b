//! Email + password sign-in and registration, including the password-linking path.
//!
//! Registration links a password onto the active session when its email matches the
//! requested one; otherwise it creates a new account. The decision and the provider call run
//! under a per-facade guard so two concurrent registrations cannot both observe "no session"
//! and race a link against a create.

// self
use crate::{
	auth::Password,
	facade::{self, AuthFacade},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	outcome::{AuthResult, ErrorContext, messages},
	provider::IdentityProvider,
};

impl<P> AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	/// Signs in with email + password.
	///
	/// Unknown accounts and wrong passwords produce the same
	/// [`InvalidCredential`](crate::outcome::ErrorKind::InvalidCredential) failure.
	pub async fn sign_in_with_password(
		&self,
		email: &str,
		password: impl Into<Password>,
	) -> AuthResult {
		const KIND: OperationKind = OperationKind::PasswordSignIn;

		let password = password.into();
		let span = OperationSpan::new(KIND, "sign_in_with_password");

		span.instrument(async move {
			obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

			if let Some(failure) = self.check_password_length(&password) {
				return facade::reject(KIND, failure);
			}

			let outcome = self.call(self.provider.sign_in_with_password(email, &password)).await;

			facade::conclude(KIND, ErrorContext::SignIn, outcome, || messages::SIGNED_IN.into())
		})
		.await
	}

	/// Registers an email + password credential.
	///
	/// When the signed-in session's email matches `email` (ignoring ASCII case and surrounding
	/// whitespace) the password is linked onto that session and its id is kept; otherwise a new
	/// account is created.
	pub async fn register_with_password(
		&self,
		email: &str,
		password: impl Into<Password>,
	) -> AuthResult {
		let password = password.into();
		let span = OperationSpan::new(OperationKind::Registration, "register_with_password");

		span.instrument(async move {
			let _registration = self.registration_guard.lock().await;
			let active = self.provider.current_session().filter(|s| s.email_matches(email));
			let (kind, message) = match active {
				Some(_) => (OperationKind::PasswordLink, messages::PASSWORD_LINKED),
				None => (OperationKind::Registration, messages::REGISTERED),
			};

			obs::record_operation_outcome(kind, OperationOutcome::Attempt);

			if let Some(failure) = self.check_password_length(&password) {
				return facade::reject(kind, failure);
			}

			let outcome = match active.as_ref() {
				Some(session) => {
					obs::record_event("register_with_password.link", &session.uid);

					self.call(self.provider.link_password(session, email, &password)).await
				},
				None => self.call(self.provider.create_account(email, &password)).await,
			};

			facade::conclude(kind, ErrorContext::Registration, outcome, || message.into())
		})
		.await
	}
}
