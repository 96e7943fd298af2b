//! Authentication facade for managed identity providers: password sign-in, registration with
//! password linking, popup sign-in, sign-out, and serialized session observation, all normalized
//! into typed results with user-facing messages.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod outcome;
pub mod provider;
pub mod session;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{FacadeConfig, Platform},
		facade::AuthFacade,
		provider::MemoryIdentityProvider,
	};

	/// Facade type alias used by memory-backed integration tests.
	pub type MemoryTestFacade = AuthFacade<MemoryIdentityProvider>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> crate::http::ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		crate::http::ReqwestHttpClient::with_client(client)
	}

	/// Password that satisfies the default minimum length.
	pub const TEST_PASSWORD: &str = "hunter22";

	/// Builds the facade configuration used across tests: web platform, no timeout.
	pub fn test_config() -> FacadeConfig {
		FacadeConfig::builder()
			.platform(Platform::Web)
			.request_timeout(None)
			.build()
			.expect("Failed to build facade config for tests.")
	}

	/// Constructs a [`AuthFacade`] backed by a fresh in-memory identity provider.
	pub fn build_memory_test_facade() -> (MemoryTestFacade, Arc<MemoryIdentityProvider>) {
		build_memory_test_facade_with(test_config())
	}

	/// Same as [`build_memory_test_facade`] but with a caller-supplied configuration.
	pub fn build_memory_test_facade_with(
		config: FacadeConfig,
	) -> (MemoryTestFacade, Arc<MemoryIdentityProvider>) {
		let provider = Arc::new(MemoryIdentityProvider::default());
		let facade = AuthFacade::new(provider.clone(), config);

		(facade, provider)
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
