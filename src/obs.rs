//! Optional observability helpers for facade operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `auth_facade.operation` with the
//!   `operation` and `stage` (call site) fields, plus warning events from provider clients.
//! - Enable `metrics` to increment the `auth_facade_operation_total` counter for every
//!   attempt/success/failure/cancellation, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Facade operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Email + password sign-in.
	PasswordSignIn,
	/// New password account.
	Registration,
	/// Password credential linked onto the active session.
	PasswordLink,
	/// Federated popup sign-in.
	ThirdPartySignIn,
	/// Sign-out.
	SignOut,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::PasswordSignIn => "password_sign_in",
			OperationKind::Registration => "registration",
			OperationKind::PasswordLink => "password_link",
			OperationKind::ThirdPartySignIn => "third_party_sign_in",
			OperationKind::SignOut => "sign_out",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a facade operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure returned to the caller.
	Failure,
	/// User abandoned the flow.
	Cancelled,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
			OperationOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
