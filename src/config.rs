//! Facade configuration: target platform, federated provider, local password policy, and the
//! per-call timeout.

// self
use crate::{_prelude::*, auth::FederatedProvider, error::ConfigError};

/// Minimum password length enforced before any provider call.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
/// Per-call timeout applied to provider operations.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Platform the facade runs on; decides whether interactive popups are available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	/// Browser runtime with popup support.
	#[default]
	Web,
	/// iOS native runtime.
	Ios,
	/// Android native runtime.
	Android,
	/// Desktop native runtime.
	Desktop,
}
impl Platform {
	/// Returns `true` when the platform can host the federated sign-in popup.
	pub const fn supports_popup(self) -> bool {
		matches!(self, Self::Web)
	}

	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Web => "web",
			Self::Ios => "ios",
			Self::Android => "android",
			Self::Desktop => "desktop",
		}
	}
}
impl Display for Platform {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validated facade configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacadeConfig {
	/// Platform the facade runs on.
	pub platform: Platform,
	/// Federated provider offered by third-party sign-in.
	pub federated_provider: FederatedProvider,
	/// Passwords with fewer characters are rejected locally.
	pub min_password_length: usize,
	/// Per-call timeout; `None` lets provider calls run unbounded.
	///
	/// The timeout runs on the Tokio timer, so while it is set, facade calls must be polled
	/// inside a Tokio runtime with the time driver enabled. Set `None` to drive the facade
	/// from any executor.
	pub request_timeout: Option<StdDuration>,
}
impl FacadeConfig {
	/// Starts a builder seeded with the defaults.
	pub fn builder() -> FacadeConfigBuilder {
		FacadeConfigBuilder::default()
	}

	/// Parses a JSON document, reporting the exact path of the first malformed field.
	///
	/// Missing fields take their defaults; `"request_timeout_ms": null` disables the timeout.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let document: FacadeConfigDocument = serde_path_to_error::deserialize(de)?;

		document.into_builder().build()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.min_password_length == 0 {
			return Err(ConfigError::ZeroPasswordLength);
		}
		if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(())
	}
}
impl Default for FacadeConfig {
	fn default() -> Self {
		Self {
			platform: Platform::default(),
			federated_provider: FederatedProvider::default(),
			min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
			request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
		}
	}
}

/// Builder for [`FacadeConfig`] values.
#[derive(Debug, Default)]
pub struct FacadeConfigBuilder {
	config: FacadeConfig,
}
impl FacadeConfigBuilder {
	/// Sets the platform.
	pub fn platform(mut self, platform: Platform) -> Self {
		self.config.platform = platform;

		self
	}

	/// Sets the federated provider used by third-party sign-in.
	pub fn federated_provider(mut self, provider: FederatedProvider) -> Self {
		self.config.federated_provider = provider;

		self
	}

	/// Sets the local minimum password length.
	pub fn min_password_length(mut self, len: usize) -> Self {
		self.config.min_password_length = len;

		self
	}

	/// Sets the per-call timeout; `None` disables it.
	///
	/// A timeout requires a Tokio runtime with the time driver enabled.
	pub fn request_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.config.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the configuration.
	pub fn build(self) -> Result<FacadeConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FacadeConfigDocument {
	#[serde(default)]
	platform: Platform,
	#[serde(default)]
	federated_provider: FederatedProvider,
	#[serde(default = "default_min_password_length")]
	min_password_length: usize,
	#[serde(default = "default_request_timeout_ms")]
	request_timeout_ms: Option<u64>,
}
impl FacadeConfigDocument {
	fn into_builder(self) -> FacadeConfigBuilder {
		FacadeConfig::builder()
			.platform(self.platform)
			.federated_provider(self.federated_provider)
			.min_password_length(self.min_password_length)
			.request_timeout(self.request_timeout_ms.map(StdDuration::from_millis))
	}
}

fn default_min_password_length() -> usize {
	DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_request_timeout_ms() -> Option<u64> {
	Some(DEFAULT_REQUEST_TIMEOUT.as_millis() as u64)
}
