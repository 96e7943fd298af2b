//! Provider error codes and the error type every [`IdentityProvider`](super::IdentityProvider)
//! returns.

// self
use crate::{_prelude::*, error::TransportError};

/// Client-facing error codes documented for the provider operations the facade calls.
///
/// Anything outside the documented set lands in [`ProviderErrorCode::Other`] with the raw
/// code preserved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
	/// `invalid-email`
	InvalidEmail,
	/// `user-disabled`
	UserDisabled,
	/// `user-not-found`
	UserNotFound,
	/// `wrong-password`
	WrongPassword,
	/// `invalid-credential`
	InvalidCredential,
	/// `email-already-in-use`
	EmailAlreadyInUse,
	/// `weak-password`
	WeakPassword,
	/// `network-request-failed`
	NetworkRequestFailed,
	/// `too-many-requests`
	TooManyRequests,
	/// `operation-not-allowed`
	OperationNotAllowed,
	/// `provider-already-linked`
	ProviderAlreadyLinked,
	/// `credential-already-in-use`
	CredentialAlreadyInUse,
	/// `popup-closed-by-user`
	PopupClosedByUser,
	/// `cancelled-popup-request`
	CancelledPopupRequest,
	/// Any other code, kept verbatim (without the `auth/` prefix).
	Other(String),
}
impl ProviderErrorCode {
	const CLIENT_PREFIX: &str = "auth/";

	/// Parses a client code such as `auth/invalid-email` or `invalid-email`.
	pub fn parse(code: &str) -> Self {
		let code = code.trim();
		let code = code.strip_prefix(Self::CLIENT_PREFIX).unwrap_or(code);

		match code {
			"invalid-email" => Self::InvalidEmail,
			"user-disabled" => Self::UserDisabled,
			"user-not-found" => Self::UserNotFound,
			"wrong-password" => Self::WrongPassword,
			"invalid-credential" => Self::InvalidCredential,
			"email-already-in-use" => Self::EmailAlreadyInUse,
			"weak-password" => Self::WeakPassword,
			"network-request-failed" => Self::NetworkRequestFailed,
			"too-many-requests" => Self::TooManyRequests,
			"operation-not-allowed" => Self::OperationNotAllowed,
			"provider-already-linked" => Self::ProviderAlreadyLinked,
			"credential-already-in-use" => Self::CredentialAlreadyInUse,
			"popup-closed-by-user" => Self::PopupClosedByUser,
			"cancelled-popup-request" => Self::CancelledPopupRequest,
			other => Self::Other(other.to_owned()),
		}
	}

	/// Maps an Identity Toolkit server code (`EMAIL_NOT_FOUND`, `WEAK_PASSWORD : ...`) onto the
	/// client code the provider SDKs report for it.
	pub fn from_server_code(raw: &str) -> Self {
		let code = raw.split([' ', ':']).next().unwrap_or_default();

		match code {
			"INVALID_EMAIL" => Self::InvalidEmail,
			"USER_DISABLED" => Self::UserDisabled,
			"EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
			"INVALID_PASSWORD" => Self::WrongPassword,
			"INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => Self::InvalidCredential,
			"EMAIL_EXISTS" => Self::EmailAlreadyInUse,
			"WEAK_PASSWORD" => Self::WeakPassword,
			"TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
			"OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => Self::OperationNotAllowed,
			"PROVIDER_ALREADY_LINKED" => Self::ProviderAlreadyLinked,
			"FEDERATED_USER_ID_ALREADY_LINKED" => Self::CredentialAlreadyInUse,
			"CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => Self::Other("requires-recent-login".into()),
			"TOKEN_EXPIRED" => Self::Other("user-token-expired".into()),
			"INVALID_REFRESH_TOKEN" => Self::Other("invalid-refresh-token".into()),
			"" => Self::Other("internal-error".into()),
			other => Self::Other(other.to_owned()),
		}
	}

	/// Returns the client code without the `auth/` prefix.
	pub fn as_str(&self) -> &str {
		match self {
			Self::InvalidEmail => "invalid-email",
			Self::UserDisabled => "user-disabled",
			Self::UserNotFound => "user-not-found",
			Self::WrongPassword => "wrong-password",
			Self::InvalidCredential => "invalid-credential",
			Self::EmailAlreadyInUse => "email-already-in-use",
			Self::WeakPassword => "weak-password",
			Self::NetworkRequestFailed => "network-request-failed",
			Self::TooManyRequests => "too-many-requests",
			Self::OperationNotAllowed => "operation-not-allowed",
			Self::ProviderAlreadyLinked => "provider-already-linked",
			Self::CredentialAlreadyInUse => "credential-already-in-use",
			Self::PopupClosedByUser => "popup-closed-by-user",
			Self::CancelledPopupRequest => "cancelled-popup-request",
			Self::Other(code) => code.as_str(),
		}
	}

	/// Returns `true` for codes that mean the session's refresh token is no longer accepted.
	pub fn revokes_session(&self) -> bool {
		match self {
			Self::UserDisabled | Self::UserNotFound => true,
			Self::Other(code) =>
				matches!(code.as_str(), "user-token-expired" | "invalid-refresh-token"),
			_ => false,
		}
	}

	/// Returns `true` for codes that mean the user abandoned an interactive flow.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Self::PopupClosedByUser | Self::CancelledPopupRequest)
	}
}
impl Display for ProviderErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}{}", Self::CLIENT_PREFIX, self.as_str())
	}
}
impl FromStr for ProviderErrorCode {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::parse(s))
	}
}

/// Failure reported by an identity provider.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Identity provider returned {code}.")]
pub struct ProviderError {
	/// Client-facing error code.
	pub code: ProviderErrorCode,
	/// Raw provider message, if one was supplied.
	pub message: Option<String>,
}
impl ProviderError {
	/// Creates an error without a provider message.
	pub fn new(code: ProviderErrorCode) -> Self {
		Self { code, message: None }
	}

	/// Attaches the provider's raw message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}

	/// Network-level failure with a diagnostic message.
	pub fn network(message: impl Into<String>) -> Self {
		Self::new(ProviderErrorCode::NetworkRequestFailed).with_message(message)
	}

	/// Returns `true` if the user abandoned an interactive flow.
	pub fn is_cancellation(&self) -> bool {
		self.code.is_cancellation()
	}
}
impl From<ProviderErrorCode> for ProviderError {
	fn from(code: ProviderErrorCode) -> Self {
		Self::new(code)
	}
}
impl From<Error> for ProviderError {
	fn from(e: Error) -> Self {
		match e {
			Error::Provider(inner) => inner,
			Error::Transport(TransportError::ResponseParse { source, .. }) =>
				Self::new(ProviderErrorCode::Other("internal-error".into()))
					.with_message(format!("Malformed provider response at `{}`.", source.path())),
			Error::Transport(inner) => Self::network(inner.to_string()),
			other => Self::new(ProviderErrorCode::Other("internal-error".into()))
				.with_message(other.to_string()),
		}
	}
}
