//! User-facing message catalogue.

/// `invalid-email`.
pub const INVALID_EMAIL: &str = "The email address is not valid";
/// `user-disabled`.
pub const ACCOUNT_DISABLED: &str = "This account has been disabled";
/// Merged `invalid-credential`/`user-not-found`/`wrong-password` during sign-in.
pub const INVALID_CREDENTIAL_SIGN_IN: &str = "Account not registered or password incorrect";
/// `invalid-credential` while registering or linking a password.
pub const INVALID_CREDENTIAL_REGISTRATION: &str =
	"This email has no password configured; sign in with the third-party provider first";
/// `email-already-in-use`.
pub const EMAIL_IN_USE: &str = "This email is already registered";
/// `weak-password` and the local length check.
pub const WEAK_PASSWORD: &str = "Password must be at least 6 characters";
/// `network-request-failed` and request timeouts.
pub const NETWORK_ERROR: &str = "Connection error. Check your internet";
/// `too-many-requests`.
pub const RATE_LIMITED: &str = "Too many attempts. Try again later";
/// `operation-not-allowed`.
pub const OPERATION_NOT_ALLOWED: &str = "Operation not permitted";
/// `provider-already-linked`.
pub const ALREADY_LINKED: &str = "This authentication method is already linked";
/// `credential-already-in-use`.
pub const CREDENTIAL_IN_USE: &str = "This credential is already in use by another account";
/// Popup sign-in requested on a platform without popups.
pub const UNSUPPORTED_PLATFORM: &str = "third-party sign-in not available on this platform";
/// Any sign-out failure.
pub const SIGN_OUT_FAILED: &str = "Failed to sign out";
/// Unrecognized code without a provider message.
pub const UNKNOWN: &str = "Unknown error";

/// Password sign-in succeeded.
pub const SIGNED_IN: &str = "Signed in successfully";
/// Account creation succeeded.
pub const REGISTERED: &str = "Registration successful";
/// Password linked onto the active session.
pub const PASSWORD_LINKED: &str = "Password added to your account";
/// Sign-out succeeded.
pub const SIGNED_OUT: &str = "Signed out successfully";

/// Success message for a popup sign-in with `provider_name`.
pub fn signed_in_with(provider_name: &str) -> String {
	format!("Signed in with {provider_name} successfully")
}

/// Local length-check message for a configured minimum.
pub fn weak_password(min_len: usize) -> String {
	format!("Password must be at least {min_len} characters")
}
