// Identity Toolkit and secure-token JSON bodies.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, Session, SessionTokens, TokenSecret, Uid},
	provider::{ProviderError, ProviderErrorCode},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequest<'a> {
	pub email: &'a str,
	pub password: &'a str,
	pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LinkPasswordRequest<'a> {
	pub id_token: &'a str,
	pub email: &'a str,
	pub password: &'a str,
	pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IdpRequest<'a> {
	pub post_body: &'a str,
	pub request_uri: &'a str,
	pub return_idp_credential: bool,
	pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LookupRequest<'a> {
	pub id_token: &'a str,
}

/// Token-bearing reply shared by `signInWithPassword`, `signUp`, `update`, and
/// `signInWithIdp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthReply {
	pub local_id: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub display_name: Option<String>,
	pub id_token: String,
	pub refresh_token: String,
	pub expires_in: String,
}
impl AuthReply {
	pub fn tokens(&self, now: OffsetDateTime) -> Result<SessionTokens, ProviderError> {
		tokens(&self.id_token, &self.refresh_token, &self.expires_in, now)
	}

	pub fn uid(&self) -> Result<Uid, ProviderError> {
		Uid::new(&self.local_id).map_err(malformed)
	}
}

#[derive(Debug, Deserialize)]
pub(super) struct LookupReply {
	#[serde(default)]
	pub users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountInfo {
	pub local_id: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub provider_user_info: Vec<ProviderUserInfo>,
	#[serde(default)]
	pub disabled: bool,
}
impl AccountInfo {
	/// Builds the session for this account, carrying `tokens` from the preceding auth call.
	pub fn into_session(self, tokens: SessionTokens) -> Result<Session, ProviderError> {
		let mut session = Session::new(Uid::new(&self.local_id).map_err(malformed)?);

		session.email = self.email;
		session.display_name = self.display_name;
		session.tokens = Some(tokens);

		for info in self.provider_user_info {
			session.link(ProviderId::new(&info.provider_id).map_err(malformed)?);
		}

		Ok(session)
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProviderUserInfo {
	pub provider_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RefreshReply {
	pub id_token: String,
	pub refresh_token: String,
	pub expires_in: String,
	pub user_id: String,
}
impl RefreshReply {
	pub fn tokens(&self, now: OffsetDateTime) -> Result<SessionTokens, ProviderError> {
		tokens(&self.id_token, &self.refresh_token, &self.expires_in, now)
	}
}

/// `{"error":{"code":400,"message":"EMAIL_EXISTS"}}`
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
	pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
	#[serde(default)]
	pub message: String,
}
impl ErrorBody {
	pub fn into_provider_error(self) -> ProviderError {
		let code = ProviderErrorCode::from_server_code(&self.message);

		ProviderError::new(code).with_message(self.message)
	}
}

fn tokens(
	id_token: &str,
	refresh_token: &str,
	expires_in: &str,
	now: OffsetDateTime,
) -> Result<SessionTokens, ProviderError> {
	let secs = expires_in.trim().parse::<i64>().map_err(malformed)?;
	let expires_at = now
		.checked_add(Duration::seconds(secs))
		.ok_or_else(|| malformed(format_args!("expiresIn `{secs}` is out of range")))?;

	Ok(SessionTokens {
		id_token: TokenSecret::new(id_token),
		refresh_token: TokenSecret::new(refresh_token),
		expires_at,
	})
}

fn malformed(e: impl Display) -> ProviderError {
	ProviderError::new(ProviderErrorCode::Other("internal-error".into()))
		.with_message(format!("Malformed provider response: {e}"))
}
