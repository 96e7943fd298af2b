// self
use crate::{
	auth::Session,
	facade::{self, AuthFacade},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	outcome::{AuthFailure, AuthResult, ErrorKind, messages},
	provider::IdentityProvider,
	session::SessionSubscription,
};

impl<P> AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	/// Signs the current session out.
	///
	/// Any provider failure becomes [`ErrorKind::SignOutFailed`]; the provider's own message
	/// is logged, never shown.
	pub async fn sign_out(&self) -> AuthResult<()> {
		const KIND: OperationKind = OperationKind::SignOut;

		let span = OperationSpan::new(KIND, "sign_out");

		span.instrument(async move {
			obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

			match self.call(self.provider.sign_out()).await {
				Ok(()) => {
					obs::record_operation_outcome(KIND, OperationOutcome::Success);

					AuthResult::success((), messages::SIGNED_OUT)
				},
				Err(e) => {
					obs::record_warning("sign_out", &e);

					facade::reject(
						KIND,
						AuthFailure::rejected(ErrorKind::SignOutFailed, messages::SIGN_OUT_FAILED),
					)
				},
			}
		})
		.await
	}

	/// Provider-cached session; never blocks on the network.
	pub fn current_session(&self) -> Option<Session> {
		self.provider.current_session()
	}

	/// Registers `listener` for session changes.
	///
	/// The listener receives the current state once immediately (`None` when signed out),
	/// then once per transition in transition order. Deliveries never overlap. Drop the
	/// returned handle, or call [`SessionSubscription::unsubscribe`], to stop them.
	pub fn observe_session_changes<F>(&self, listener: F) -> SessionSubscription
	where
		F: 'static + Fn(Option<&Session>) + Send + Sync,
	{
		self.provider.session_state().subscribe(listener)
	}
}
