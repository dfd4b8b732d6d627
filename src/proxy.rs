//! Request orchestration: validate, authenticate, call upstream, map.
//!
//! [`Proxy::handle`] runs a single fail-fast pass over one inbound request and is the only
//! place where a failure becomes a transport status. Every response carries a JSON body,
//! either the mapped payload or `{"error": <message>}`, plus the echoed correlation id.

pub mod contract;

pub use contract::*;

// crates.io
use axum::body::Bytes;
// self
use crate::{
	_prelude::*,
	config::ProxyConfig,
	http::{ReqwestHttpClient, TokenHttpClient},
	issuer::TokenIssuer,
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, RequestOutcome, RequestSpan},
	secrets::{CredentialResolver, SecretStore},
	upstream::{CORRELATION_ID_HEADER, UpstreamClient},
};

/// Proxy specialized for the crate's default reqwest transport stack.
pub type ReqwestProxy = Proxy<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Inbound request as delivered by the HTTP trigger.
#[derive(Clone, Debug, Default)]
pub struct InboundRequest {
	/// Request headers.
	pub headers: HeaderMap,
	/// Raw request body.
	pub body: Bytes,
}
impl InboundRequest {
	/// Creates a request from headers and a body.
	pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
		Self { headers, body: body.into() }
	}
}

/// Transport-neutral response produced by the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyResponse {
	/// Status code.
	pub status: StatusCode,
	/// Extra response headers (the echoed correlation id).
	pub headers: HeaderMap,
	/// JSON body.
	pub body: JsonValue,
}
impl ProxyResponse {
	/// `200` with the mapped payload.
	pub fn success(body: JsonValue, correlation_id: &HeaderValue) -> Self {
		Self::new(StatusCode::OK, body, correlation_id)
	}

	/// `400`/`500` with `{"error": <message>}` depending on the failure.
	pub fn failure(error: &Error, correlation_id: &HeaderValue) -> Self {
		Self::new(
			error.status_code(),
			serde_json::json!({ "error": error.to_string() }),
			correlation_id,
		)
	}

	/// Raw correlation id header echoed on this response.
	pub fn correlation_header(&self) -> Option<&HeaderValue> {
		self.headers.get(CORRELATION_ID_HEADER)
	}

	/// Correlation id echoed on this response, when it is visible ASCII.
	pub fn correlation_id(&self) -> Option<&str> {
		self.correlation_header().and_then(|value| value.to_str().ok())
	}

	fn new(status: StatusCode, body: JsonValue, correlation_id: &HeaderValue) -> Self {
		let mut headers = HeaderMap::new();

		headers.insert(HeaderName::from_static(CORRELATION_ID_HEADER), correlation_id.clone());

		Self { status, headers, body }
	}
}

/// Orchestrates credential resolution, token issuance, and the upstream lookup.
pub struct Proxy<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	contract: Contract,
	credentials: CredentialResolver,
	issuer: TokenIssuer<C, M>,
	upstream: UpstreamClient,
}
impl<C, M> Proxy<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Composes a proxy from its collaborators.
	pub fn new(
		contract: Contract,
		credentials: CredentialResolver,
		issuer: TokenIssuer<C, M>,
		upstream: UpstreamClient,
	) -> Self {
		Self { contract, credentials, issuer, upstream }
	}

	/// Contract served by this proxy.
	pub fn contract(&self) -> Contract {
		self.contract
	}

	/// Token issuer (and through it, the token cache).
	pub fn issuer(&self) -> &TokenIssuer<C, M> {
		&self.issuer
	}

	/// Handles one inbound request end to end; never fails at the transport level.
	pub async fn handle(&self, request: InboundRequest) -> ProxyResponse {
		let correlation_id = contract::correlation_id(&request.headers);
		let label = contract::correlation_label(&correlation_id);
		let span = RequestSpan::new(self.contract, &label);

		obs::record_request_outcome(self.contract, RequestOutcome::Attempt);

		let result = span.instrument(self.lookup(&request)).await;
		let (response, outcome) = match result {
			Ok(payload) =>
				(ProxyResponse::success(payload, &correlation_id), RequestOutcome::Success),
			Err(e) if e.is_client_error() => {
				tracing::warn!(correlation_id = %label, error = %e, "Rejected invalid request.");

				(ProxyResponse::failure(&e, &correlation_id), RequestOutcome::ClientError)
			},
			Err(e) => {
				tracing::error!(correlation_id = %label, error = %e, "Proxy failure.");

				(ProxyResponse::failure(&e, &correlation_id), RequestOutcome::ServerError)
			},
		};

		obs::record_request_outcome(self.contract, outcome);

		response
	}

	/// Runs validate → authenticate → upstream → map, returning the mapped payload.
	pub async fn lookup(&self, request: &InboundRequest) -> Result<JsonValue> {
		let lookup = self.contract.extract(&request.headers, &request.body)?;
		let token = self.issuer.token(&self.credentials).await?;
		let payload = self.upstream.lookup(&token, &lookup).await?;

		Ok(self.contract.map_payload(payload))
	}
}
impl Proxy<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds the default reqwest-backed proxy from configuration and a secret store.
	pub fn from_config(config: &ProxyConfig, store: Arc<dyn SecretStore>) -> Result<Self> {
		let credentials = CredentialResolver::new(store, config.secret_store.secret_name.clone());
		let issuer = TokenIssuer::new(config.token_endpoint.clone(), config.timeout)?;
		let upstream =
			UpstreamClient::new(config.upstream_base_url.clone(), config.contract, config.timeout)?;

		Ok(Self::new(config.contract, credentials, issuer, upstream))
	}
}
impl<C, M> Debug for Proxy<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Proxy")
			.field("contract", &self.contract)
			.field("credentials", &self.credentials)
			.field("issuer", &self.issuer)
			.field("upstream", &self.upstream)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn failure_response_carries_error_and_correlation_id() {
		let error = Error::invalid_input("Missing required header: Identifier");
		let response = ProxyResponse::failure(&error, &HeaderValue::from_static("c-1"));

		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		assert_eq!(response.body["error"], "Missing required header: Identifier");
		assert_eq!(response.correlation_id(), Some("c-1"));
	}

	#[test]
	fn success_response_echoes_correlation_id_verbatim() {
		let response = ProxyResponse::success(
			serde_json::json!({"ok": true}),
			&HeaderValue::from_static("Trace-ID_42"),
		);

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.correlation_id(), Some("Trace-ID_42"));
	}

	#[tokio::test]
	async fn non_ascii_correlation_id_is_echoed_byte_for_byte() {
		let raw = "trace-é".as_bytes();
		let mut headers = HeaderMap::new();

		headers.insert(
			HeaderName::from_static(CORRELATION_ID_HEADER),
			HeaderValue::from_bytes(raw).expect("Opaque header bytes should be accepted."),
		);

		let proxy = ReqwestProxy::from_config(
			&ProxyConfig::from_lookup(|name: &str| match name {
				"COGNITO_DOMAIN" => Some("auth.example.com".into()),
				"GUID_API_URL" => Some("http://127.0.0.1:1".into()),
				_ => None,
			})
			.expect("Minimal configuration should load."),
			Arc::new(crate::secrets::MemorySecretStore::default()),
		)
		.expect("Proxy should build.");
		let response = proxy.handle(InboundRequest::new(headers, "")).await;

		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		assert_eq!(response.correlation_header().map(HeaderValue::as_bytes), Some(raw));
	}
}
