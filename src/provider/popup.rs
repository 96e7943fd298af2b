//! Platform hook that runs the interactive federated sign-in popup.

// self
use crate::{
	_prelude::*,
	auth::{FederatedProvider, TokenSecret},
	provider::{ProviderError, ProviderErrorCode},
};

/// Boxed future returned by [`PopupHost::authorize`].
pub type PopupFuture<'a> =
	Pin<Box<dyn Future<Output = Result<IdpCredential, ProviderError>> + 'a + Send>>;

/// Shows the federated provider's consent popup and returns the credential it produced.
///
/// Implementations report a dismissed popup with
/// [`ProviderErrorCode::PopupClosedByUser`] and a superseded one with
/// [`ProviderErrorCode::CancelledPopupRequest`].
pub trait PopupHost
where
	Self: Send + Sync,
{
	/// Runs the popup for `provider`.
	fn authorize<'a>(&'a self, provider: &'a FederatedProvider) -> PopupFuture<'a>;
}

/// Credential returned by a federated provider's popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdpCredential {
	/// OpenID Connect id token.
	IdToken(TokenSecret),
	/// OAuth access token.
	AccessToken(TokenSecret),
}
impl IdpCredential {
	/// Encodes the credential as the `postBody` the Identity Toolkit expects.
	pub fn post_body(&self, provider: &FederatedProvider) -> String {
		let (field, token) = match self {
			Self::IdToken(token) => ("id_token", token),
			Self::AccessToken(token) => ("access_token", token),
		};

		url::form_urlencoded::Serializer::new(String::new())
			.append_pair(field, token.expose())
			.append_pair("providerId", &provider.id)
			.finish()
	}
}

/// Popup host for platforms without interactive popups; every request fails with
/// `operation-not-allowed`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPopupHost;
impl PopupHost for NoPopupHost {
	fn authorize<'a>(&'a self, _provider: &'a FederatedProvider) -> PopupFuture<'a> {
		Box::pin(async {
			Err(ProviderError::new(ProviderErrorCode::OperationNotAllowed)
				.with_message("No popup host is configured."))
		})
	}
}
