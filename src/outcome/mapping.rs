// self
use crate::{
	outcome::{AuthFailure, ErrorKind, messages},
	provider::{ProviderError, ProviderErrorCode},
};

/// Operation a provider error was raised from; selects context-dependent messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
	/// Password sign-in.
	SignIn,
	/// Account creation or password linking.
	Registration,
	/// Popup sign-in.
	ThirdParty,
}

/// Translates a provider error into the failure shown to the user.
///
/// `user-not-found`, `wrong-password`, and `invalid-credential` share one message so the UI
/// never reveals whether an email is registered. Popup dismissals become
/// [`AuthFailure::Cancelled`].
pub fn map_provider_error(error: &ProviderError, context: ErrorContext) -> AuthFailure {
	let (reason, message) = match &error.code {
		ProviderErrorCode::PopupClosedByUser | ProviderErrorCode::CancelledPopupRequest =>
			return AuthFailure::Cancelled,
		ProviderErrorCode::InvalidEmail => (ErrorKind::InvalidEmail, messages::INVALID_EMAIL),
		ProviderErrorCode::UserDisabled =>
			(ErrorKind::AccountDisabled, messages::ACCOUNT_DISABLED),
		ProviderErrorCode::UserNotFound
		| ProviderErrorCode::WrongPassword
		| ProviderErrorCode::InvalidCredential => (ErrorKind::InvalidCredential, match context {
			ErrorContext::Registration => messages::INVALID_CREDENTIAL_REGISTRATION,
			ErrorContext::SignIn | ErrorContext::ThirdParty =>
				messages::INVALID_CREDENTIAL_SIGN_IN,
		}),
		ProviderErrorCode::EmailAlreadyInUse => (ErrorKind::EmailInUse, messages::EMAIL_IN_USE),
		ProviderErrorCode::WeakPassword => (ErrorKind::WeakPassword, messages::WEAK_PASSWORD),
		ProviderErrorCode::NetworkRequestFailed =>
			(ErrorKind::NetworkError, messages::NETWORK_ERROR),
		ProviderErrorCode::TooManyRequests => (ErrorKind::RateLimited, messages::RATE_LIMITED),
		ProviderErrorCode::OperationNotAllowed =>
			(ErrorKind::OperationNotAllowed, messages::OPERATION_NOT_ALLOWED),
		ProviderErrorCode::ProviderAlreadyLinked =>
			(ErrorKind::AlreadyLinked, messages::ALREADY_LINKED),
		ProviderErrorCode::CredentialAlreadyInUse =>
			(ErrorKind::CredentialInUse, messages::CREDENTIAL_IN_USE),
		ProviderErrorCode::Other(_) => {
			let message = error
				.message
				.as_deref()
				.map(str::trim)
				.filter(|message| !message.is_empty())
				.unwrap_or(messages::UNKNOWN);

			return AuthFailure::rejected(ErrorKind::Unknown, message);
		},
	};

	AuthFailure::rejected(reason, message)
}
