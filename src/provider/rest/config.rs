// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Production Identity Toolkit base URL.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/";
/// Production secure-token endpoint used for refreshes.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";
/// Redirect URI reported to `accounts:signInWithIdp` when none is configured.
pub const DEFAULT_REQUEST_URI: &str = "http://localhost";

/// Project settings for [`RestIdentityProvider`](super::RestIdentityProvider).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityToolkitConfig {
	/// Web API key appended to every request.
	pub api_key: TokenSecret,
	/// Base URL the `accounts:*` methods are resolved against.
	pub identity_endpoint: Url,
	/// Secure-token refresh endpoint.
	pub token_endpoint: Url,
	/// Redirect URI sent with federated sign-ins.
	pub request_uri: Url,
}
impl IdentityToolkitConfig {
	/// Starts a builder for `api_key` with production endpoints.
	pub fn builder(api_key: impl Into<String>) -> IdentityToolkitConfigBuilder {
		IdentityToolkitConfigBuilder::new(api_key)
	}

	/// Parses a JSON document (`api_key` required, endpoints optional).
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let document: IdentityToolkitDocument = serde_path_to_error::deserialize(de)?;
		let mut builder = Self::builder(document.api_key);

		builder.identity_endpoint = document.identity_endpoint;
		builder.token_endpoint = document.token_endpoint;
		builder.request_uri = document.request_uri;

		builder.build()
	}

	/// Resolves `accounts:<method>` against the identity endpoint and appends the API key.
	pub fn method_url(&self, method: &'static str) -> Result<Url, ConfigError> {
		// A bare `accounts:x` would parse as a URL with the `accounts` scheme.
		let mut url = self.identity_endpoint.join(&format!("./{method}")).map_err(|source| {
			ConfigError::InvalidEndpoint {
				endpoint: self.identity_endpoint.to_string(),
				method,
				source,
			}
		})?;

		url.query_pairs_mut().append_pair("key", self.api_key.expose());

		Ok(url)
	}

	/// Secure-token endpoint with the API key appended.
	pub fn token_url(&self) -> Url {
		let mut url = self.token_endpoint.clone();

		url.query_pairs_mut().append_pair("key", self.api_key.expose());

		url
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.api_key.expose().trim().is_empty() {
			return Err(ConfigError::Missing { field: "api_key" });
		}

		validate_endpoint("identity", &self.identity_endpoint)?;
		validate_endpoint("token", &self.token_endpoint)?;

		Ok(())
	}
}

/// Builder for [`IdentityToolkitConfig`] values.
#[derive(Debug)]
pub struct IdentityToolkitConfigBuilder {
	/// Web API key.
	pub api_key: TokenSecret,
	/// Identity Toolkit base URL override.
	pub identity_endpoint: Option<Url>,
	/// Secure-token endpoint override.
	pub token_endpoint: Option<Url>,
	/// Federated redirect URI override.
	pub request_uri: Option<Url>,
}
impl IdentityToolkitConfigBuilder {
	/// Creates a builder seeded with `api_key`.
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: TokenSecret::new(api_key),
			identity_endpoint: None,
			token_endpoint: None,
			request_uri: None,
		}
	}

	/// Overrides the Identity Toolkit base URL (e.g. an emulator).
	pub fn identity_endpoint(mut self, url: Url) -> Self {
		self.identity_endpoint = Some(url);

		self
	}

	/// Overrides the secure-token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the redirect URI sent with federated sign-ins.
	pub fn request_uri(mut self, url: Url) -> Self {
		self.request_uri = Some(url);

		self
	}

	/// Consumes the builder and validates the configuration.
	pub fn build(self) -> Result<IdentityToolkitConfig, ConfigError> {
		let config = IdentityToolkitConfig {
			api_key: self.api_key,
			identity_endpoint: match self.identity_endpoint {
				Some(url) => with_trailing_slash(url),
				None => default_url(DEFAULT_IDENTITY_ENDPOINT)?,
			},
			token_endpoint: match self.token_endpoint {
				Some(url) => url,
				None => default_url(DEFAULT_TOKEN_ENDPOINT)?,
			},
			request_uri: match self.request_uri {
				Some(url) => url,
				None => default_url(DEFAULT_REQUEST_URI)?,
			},
		};

		config.validate()?;

		Ok(config)
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdentityToolkitDocument {
	api_key: String,
	#[serde(default)]
	identity_endpoint: Option<Url>,
	#[serde(default)]
	token_endpoint: Option<Url>,
	#[serde(default)]
	request_uri: Option<Url>,
}

fn default_url(raw: &'static str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
		endpoint: raw.to_owned(),
		method: "",
		source,
	})
}

// `Url::join` replaces the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

// Local emulators serve plain HTTP on loopback.
fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}
