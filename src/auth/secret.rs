//! Redacting wrappers for credentials and provider-issued tokens.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping provider tokens out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// User-entered password; never serialized and redacted in every formatter.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);
impl Password {
	/// Wraps a password string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw password for the provider call.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Number of characters (not bytes) in the password.
	pub fn char_len(&self) -> usize {
		self.0.chars().count()
	}
}
impl From<&str> for Password {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for Password {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for Password {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Password").field(&"<redacted>").finish()
	}
}
