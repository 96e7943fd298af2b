//! The single entry point UI code uses for authentication.
//!
//! [`AuthFacade`] wraps an [`IdentityProvider`] and turns every provider outcome into an
//! [`AuthResult`]. No provider error escapes as a raw error: each one is mapped through
//! [`map_provider_error`] with the context of the operation that raised it, timeouts
//! surface as network errors, and popup dismissals become cancellations.

mod federated;
mod lifecycle;
mod password;

// self
use crate::{
	_prelude::*,
	auth::Password,
	config::FacadeConfig,
	obs::{self, OperationKind, OperationOutcome},
	outcome::{AuthFailure, AuthResult, ErrorContext, ErrorKind, map_provider_error, messages},
	provider::{IdentityProvider, ProviderError, ProviderFuture},
};

/// Authentication facade shared by every screen.
///
/// Cloning is cheap: clones share the provider and the registration guard, so a single
/// facade value can be injected into as many UI components as needed.
pub struct AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	provider: Arc<P>,
	config: FacadeConfig,
	registration_guard: Arc<AsyncMutex<()>>,
}
impl<P> AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	/// Creates a facade over `provider`.
	pub fn new(provider: impl Into<Arc<P>>, config: FacadeConfig) -> Self {
		Self { provider: provider.into(), config, registration_guard: Default::default() }
	}

	/// Underlying identity provider.
	pub fn provider(&self) -> &Arc<P> {
		&self.provider
	}

	/// Active configuration.
	pub fn config(&self) -> &FacadeConfig {
		&self.config
	}

	/// Awaits a provider call under the configured timeout.
	async fn call<T>(&self, fut: ProviderFuture<'_, T>) -> Result<T, ProviderError> {
		let Some(limit) = self.config.request_timeout else {
			return fut.await;
		};

		match tokio::time::timeout(limit, fut).await {
			Ok(result) => result,
			Err(_) => Err(ProviderError::network(format!(
				"Provider call did not finish within {} ms.",
				limit.as_millis()
			))),
		}
	}

	/// Rejects passwords shorter than the configured minimum before the provider is called.
	fn check_password_length(&self, password: &Password) -> Option<AuthFailure> {
		let min = self.config.min_password_length;

		(password.char_len() < min)
			.then(|| AuthFailure::rejected(ErrorKind::WeakPassword, messages::weak_password(min)))
	}
}
impl<P> Clone for AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	fn clone(&self) -> Self {
		Self {
			provider: self.provider.clone(),
			config: self.config.clone(),
			registration_guard: self.registration_guard.clone(),
		}
	}
}
impl<P> Debug for AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthFacade")
			.field("config", &self.config)
			.field("signed_in", &self.provider.current_session().is_some())
			.finish()
	}
}

/// Converts a provider outcome into an [`AuthResult`] and records the matching metric.
fn conclude<T>(
	kind: OperationKind,
	context: ErrorContext,
	outcome: Result<T, ProviderError>,
	message: impl FnOnce() -> String,
) -> AuthResult<T> {
	match outcome {
		Ok(value) => {
			obs::record_operation_outcome(kind, OperationOutcome::Success);

			AuthResult::success(value, message())
		},
		Err(e) => reject(kind, map_provider_error(&e, context)),
	}
}

/// Records a failure (or cancellation) and wraps it.
fn reject<T>(kind: OperationKind, failure: AuthFailure) -> AuthResult<T> {
	let outcome = if failure.is_cancelled() {
		OperationOutcome::Cancelled
	} else {
		OperationOutcome::Failure
	};

	obs::record_operation_outcome(kind, outcome);

	failure.into()
}
