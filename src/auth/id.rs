//! Strongly typed identifiers for sessions and linked sign-in methods.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (uid, provider).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (uid, provider).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (uid, provider).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { Uid, "Unique identifier the identity provider assigns to an account.", "Uid" }
def_id! { ProviderId, "Identifier of a sign-in method (`password`, `google.com`).", "Provider" }
impl ProviderId {
	/// Email + password sign-in method.
	pub fn password() -> Self {
		Self(PASSWORD_PROVIDER.into())
	}

	/// Google federated sign-in method.
	pub fn google() -> Self {
		Self(GOOGLE_PROVIDER.into())
	}

	/// Returns `true` for the email + password sign-in method.
	pub fn is_password(&self) -> bool {
		self.0 == PASSWORD_PROVIDER
	}
}

const PASSWORD_PROVIDER: &str = "password";
const GOOGLE_PROVIDER: &str = "google.com";

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert!(Uid::new(" uid-123").is_err(), "Leading whitespace must be rejected.");
		assert!(Uid::new("uid-123 ").is_err(), "Trailing whitespace must be rejected.");

		let uid = Uid::new("uid-123").expect("Uid fixture should be considered valid.");

		assert_eq!(uid.as_ref(), "uid-123");
		assert!(Uid::new("").is_err());
		assert!(ProviderId::new("google com").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let uid: Uid = serde_json::from_str("\"uid-42\"").expect("Uid should deserialize.");

		assert_eq!(uid.as_ref(), "uid-42");
		assert!(serde_json::from_str::<Uid>("\"with space\"").is_err());
		assert!(serde_json::from_str::<ProviderId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		Uid::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert_eq!(
			Uid::new(&too_long),
			Err(IdentifierError::TooLong { kind: "Uid", max: IDENTIFIER_MAX_LEN })
		);
	}

	#[test]
	fn well_known_providers() {
		assert!(ProviderId::password().is_password());
		assert!(!ProviderId::google().is_password());
		assert_eq!(ProviderId::google().to_string(), "google.com");
		assert_eq!(format!("{:?}", ProviderId::password()), "Provider(password)");
	}
}
