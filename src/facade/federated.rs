// self
use crate::{
	facade::{self, AuthFacade},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	outcome::{AuthFailure, AuthResult, ErrorContext, ErrorKind, messages},
	provider::IdentityProvider,
};

impl<P> AuthFacade<P>
where
	P: ?Sized + IdentityProvider,
{
	/// Signs in through the configured federated provider's popup.
	///
	/// Fails with [`ErrorKind::UnsupportedPlatform`] without calling the provider when the
	/// platform cannot host popups. A dismissed popup yields [`AuthFailure::Cancelled`].
	pub async fn sign_in_with_third_party(&self) -> AuthResult {
		const KIND: OperationKind = OperationKind::ThirdPartySignIn;

		let span = OperationSpan::new(KIND, "sign_in_with_third_party");

		span.instrument(async move {
			obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

			if !self.config.platform.supports_popup() {
				obs::record_event("sign_in_with_third_party.unsupported", &self.config.platform);

				return facade::reject(
					KIND,
					AuthFailure::rejected(
						ErrorKind::UnsupportedPlatform,
						messages::UNSUPPORTED_PLATFORM,
					),
				);
			}

			let provider = &self.config.federated_provider;
			let outcome = self.call(self.provider.sign_in_with_popup(provider)).await;

			facade::conclude(KIND, ErrorContext::ThirdParty, outcome, || {
				messages::signed_in_with(&provider.display_name)
			})
		})
		.await
	}
}
