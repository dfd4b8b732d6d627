//! Client-credentials exchange through the `oauth2` crate.
//!
//! [`ClientCredentialsExchange`] builds a basic-auth `oauth2` client for one credential pair,
//! posts `grant_type=client_credentials` to the token endpoint, and turns the response (or the
//! failure) into a [`CachedToken`] / [`TokenExchangeError`].

pub use oauth2;

// crates.io
use oauth2::{
	AccessToken, Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RefreshToken, RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, CredentialPair, TokenSecret},
	error::{ConfigError, TokenExchangeError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

type TokenClient<HasTokenUrl = EndpointNotSet> = Client<
	BasicErrorResponse,
	ClientCredentialsTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	HasTokenUrl,
>;

/// Token endpoint response body.
///
/// Only `access_token` is required. `token_type` falls back to `bearer` and `expires_in` to
/// [`CachedToken::DEFAULT_LIFETIME`] when the provider omits them.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClientCredentialsTokenResponse {
	access_token: AccessToken,
	#[serde(default = "bearer_token_type")]
	token_type: BasicTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
}
impl TokenResponse for ClientCredentialsTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<StdDuration> {
		self.expires_in.map(StdDuration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		None
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		None
	}
}

fn bearer_token_type() -> BasicTokenType {
	BasicTokenType::Bearer
}

/// Maps HTTP transport failures into [`TokenExchangeError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an exchange error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> TokenExchangeError;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> TokenExchangeError {
		match err {
			HttpClientError::Reqwest(inner) => TokenExchangeError::from(*inner),
			HttpClientError::Http(inner) => TokenExchangeError::Request(inner),
			HttpClientError::Io(inner) => TokenExchangeError::Io(inner),
			HttpClientError::Other(message) => TokenExchangeError::UnexpectedResponse {
				message: format!("HTTP client error: {message}"),
				status: meta_status(meta),
			},
			_ => TokenExchangeError::UnexpectedResponse {
				message: "HTTP client error".into(),
				status: meta_status(meta),
			},
		}
	}
}

/// One-shot client-credentials exchange for a resolved credential pair.
pub(crate) struct ClientCredentialsExchange<'a, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: TokenClient<EndpointSet>,
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, C, M> ClientCredentialsExchange<'a, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		token_endpoint: &Url,
		credentials: &CredentialPair,
		http_client: &'a C,
		error_mapper: &'a M,
	) -> Result<Self, ConfigError> {
		let token_url = TokenUrl::new(token_endpoint.to_string()).map_err(|_| {
			ConfigError::InvalidUrl { name: "COGNITO_DOMAIN", value: token_endpoint.to_string() }
		})?;
		// Basic auth is the `oauth2` default, which is what Cognito expects.
		let oauth_client = TokenClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Performs the exchange and stamps the resulting token with its expiry.
	pub(crate) async fn exchange(&self) -> Result<CachedToken, TokenExchangeError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper))?;

		Ok(map_token_response(response, OffsetDateTime::now_utc()))
	}
}

fn map_token_response(
	response: ClientCredentialsTokenResponse,
	issued_at: OffsetDateTime,
) -> CachedToken {
	let expires_in = response
		.expires_in()
		.and_then(|lifetime| i64::try_from(lifetime.as_secs()).ok())
		.map(Duration::seconds)
		.unwrap_or(CachedToken::DEFAULT_LIFETIME);

	CachedToken::issued(
		TokenSecret::new(response.access_token().secret().to_owned()),
		issued_at,
		expires_in,
	)
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> TokenExchangeError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();
	let rejected = meta_ref.is_some_and(ResponseMetadata::is_failure);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(_, body) if rejected => TokenExchangeError::Rejected {
			status: meta_status(meta_ref),
			body: meta_body(meta_ref).unwrap_or_else(|| crate::http::body_preview(&body)),
		},
		RequestTokenError::Parse(source, _) =>
			TokenExchangeError::MalformedResponse { source, status: meta_status(meta_ref) },
		RequestTokenError::Other(message) if rejected => TokenExchangeError::Rejected {
			status: meta_status(meta_ref),
			body: meta_body(meta_ref).unwrap_or(message),
		},
		RequestTokenError::Other(message) =>
			TokenExchangeError::UnexpectedResponse { message, status: meta_status(meta_ref) },
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> TokenExchangeError {
	let body = meta_body(meta).unwrap_or_else(|| match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	});

	TokenExchangeError::Rejected { status: meta_status(meta), body }
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_body(meta: Option<&ResponseMetadata>) -> Option<String> {
	meta.and_then(|value| value.body_preview.clone())
}
