//! Normalized results returned by every facade operation.
//!
//! UI code only ever sees [`AuthResult`]: a success carrying the value plus a message, or an
//! [`AuthFailure`] that is either a rejection with an [`ErrorKind`] and user-facing message,
//! or a cancellation, which is not an error and carries no message.

pub mod messages;

mod mapping;

pub use mapping::*;

// self
use crate::{_prelude::*, auth::Session};

/// Closed taxonomy of failures surfaced to UI code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	/// Email address is malformed.
	InvalidEmail,
	/// Account has been disabled by an administrator.
	AccountDisabled,
	/// Unknown account or wrong password (deliberately indistinguishable).
	InvalidCredential,
	/// Email already belongs to an account.
	EmailInUse,
	/// Password is too short.
	WeakPassword,
	/// Network failure or timeout.
	NetworkError,
	/// Provider throttled the caller.
	RateLimited,
	/// Sign-in method is disabled for the project.
	OperationNotAllowed,
	/// Sign-in method is already linked to the account.
	AlreadyLinked,
	/// Credential belongs to another account.
	CredentialInUse,
	/// Interactive sign-in is not available on this platform.
	UnsupportedPlatform,
	/// Provider sign-out failed.
	SignOutFailed,
	/// Unrecognized provider failure.
	Unknown,
}
impl ErrorKind {
	/// Returns a stable label suitable for logs or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::InvalidEmail => "invalid_email",
			ErrorKind::AccountDisabled => "account_disabled",
			ErrorKind::InvalidCredential => "invalid_credential",
			ErrorKind::EmailInUse => "email_in_use",
			ErrorKind::WeakPassword => "weak_password",
			ErrorKind::NetworkError => "network_error",
			ErrorKind::RateLimited => "rate_limited",
			ErrorKind::OperationNotAllowed => "operation_not_allowed",
			ErrorKind::AlreadyLinked => "already_linked",
			ErrorKind::CredentialInUse => "credential_in_use",
			ErrorKind::UnsupportedPlatform => "unsupported_platform",
			ErrorKind::SignOutFailed => "sign_out_failed",
			ErrorKind::Unknown => "unknown",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure half of an [`AuthResult`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthFailure {
	/// The operation failed; `user_message` is ready to show.
	Rejected {
		/// Failure category.
		reason: ErrorKind,
		/// Message suitable for an alert.
		user_message: String,
	},
	/// The user abandoned an interactive flow. UI should stay quiet.
	Cancelled,
}
impl AuthFailure {
	/// Builds a rejection.
	pub fn rejected(reason: ErrorKind, user_message: impl Into<String>) -> Self {
		Self::Rejected { reason, user_message: user_message.into() }
	}

	/// Failure category; `None` for cancellations.
	pub fn reason(&self) -> Option<ErrorKind> {
		match self {
			Self::Rejected { reason, .. } => Some(*reason),
			Self::Cancelled => None,
		}
	}

	/// Message to show; empty for cancellations.
	pub fn user_message(&self) -> &str {
		match self {
			Self::Rejected { user_message, .. } => user_message,
			Self::Cancelled => "",
		}
	}

	/// Returns `true` if the user abandoned the flow.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}
impl Display for AuthFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Rejected { reason, user_message } => write!(f, "{user_message} ({reason})"),
			Self::Cancelled => f.write_str("cancelled"),
		}
	}
}

/// Outcome of a facade operation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum AuthResult<T = Session> {
	/// The operation succeeded.
	Success {
		/// Operation payload (the session for sign-in and registration).
		value: T,
		/// Confirmation message suitable for display.
		message: String,
	},
	/// The operation failed or was cancelled.
	Failure(AuthFailure),
}
impl<T> AuthResult<T> {
	/// Builds a success.
	pub fn success(value: T, message: impl Into<String>) -> Self {
		Self::Success { value, message: message.into() }
	}

	/// Returns `true` on success.
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}

	/// Returns `true` if the user cancelled.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Failure(failure) if failure.is_cancelled())
	}

	/// Success payload, if any.
	pub fn value(&self) -> Option<&T> {
		match self {
			Self::Success { value, .. } => Some(value),
			Self::Failure(_) => None,
		}
	}

	/// Failure, if any.
	pub fn failure(&self) -> Option<&AuthFailure> {
		match self {
			Self::Success { .. } => None,
			Self::Failure(failure) => Some(failure),
		}
	}

	/// Message to display: the confirmation on success, the user message on failure.
	pub fn message(&self) -> &str {
		match self {
			Self::Success { message, .. } => message,
			Self::Failure(failure) => failure.user_message(),
		}
	}

	/// Converts into a standard [`Result`], dropping the success message.
	pub fn into_result(self) -> Result<T, AuthFailure> {
		match self {
			Self::Success { value, .. } => Ok(value),
			Self::Failure(failure) => Err(failure),
		}
	}
}
impl<T> From<AuthFailure> for AuthResult<T> {
	fn from(failure: AuthFailure) -> Self {
		Self::Failure(failure)
	}
}
