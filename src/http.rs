//! Reqwest transport shared by the HTTP provider clients.
//!
//! [`ReqwestHttpClient`] keeps one connection pool per provider and exposes the two body
//! encodings the Identity Toolkit endpoints accept: JSON and URL-encoded forms. Replies are
//! returned raw ([`HttpReply`]) so callers decide how to decode success and error bodies.

// std
use std::ops::Deref;
// crates.io
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
// self
use crate::{_prelude::*, error::TransportError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Identity endpoints answer directly and never redirect; configure any custom
/// [`ReqwestClient`] accordingly.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// POSTs `body` as JSON.
	pub async fn post_json<B>(&self, url: Url, body: &B) -> Result<HttpReply, TransportError>
	where
		B: ?Sized + Serialize,
	{
		let request = self.0.post(url).header(ACCEPT, HeaderValue::from_static("application/json"));

		Self::send(request.json(body)).await
	}

	/// POSTs `pairs` as an URL-encoded form.
	pub async fn post_form(
		&self,
		url: Url,
		pairs: &[(&str, &str)],
	) -> Result<HttpReply, TransportError> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(pairs.iter().copied())
			.finish();
		let request = self
			.0
			.post(url)
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
			.body(body);

		Self::send(request).await
	}

	async fn send(request: reqwest::RequestBuilder) -> Result<HttpReply, TransportError> {
		let response = request.send().await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?.to_vec();

		Ok(HttpReply { status, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Raw HTTP reply: status code plus the undecoded body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body as JSON, keeping the failing path on error.
	pub fn json<T>(&self) -> Result<T, TransportError>
	where
		T: for<'de> Deserialize<'de>,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(de)
			.map_err(|source| TransportError::ResponseParse { source, status: Some(self.status) })
	}
}
