//! Token cache + issuer: returns a usable bearer token, exchanging client credentials only on
//! a cache miss.
//!
//! The fast path reads the shared [`TokenCache`] without waiting on anything. On a miss the
//! issuer takes the cache's refresh guard, re-checks the slot (a concurrent request may have
//! refreshed it meanwhile), resolves credentials, performs the exchange, and stores the new
//! token before releasing the guard.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	cache::TokenCache,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ClientCredentialsExchange, ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, TokenSource},
	secrets::CredentialResolver,
};

/// Issuer specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenIssuer = TokenIssuer<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Issues bearer tokens for the configured token endpoint.
pub struct TokenIssuer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every token request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors.
	pub transport_mapper: Arc<M>,
	/// OAuth token endpoint.
	pub token_endpoint: Url,
	cache: Arc<TokenCache>,
}
impl<C, M> TokenIssuer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an issuer with a fresh, empty cache.
	pub fn with_http_client(
		token_endpoint: Url,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			token_endpoint,
			cache: Default::default(),
		}
	}

	/// Replaces the cache, e.g. to share one slot between issuers or to pre-seed it.
	pub fn with_cache(mut self, cache: Arc<TokenCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Cache backing this issuer.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Returns a usable token, resolving credentials only when an exchange is required.
	pub async fn token(&self, credentials: &CredentialResolver) -> Result<TokenSecret> {
		self.token_or_exchange(|| credentials.resolve()).await
	}

	/// Returns a usable token, exchanging the given credentials on a cache miss.
	pub async fn token_with(&self, credentials: &CredentialPair) -> Result<TokenSecret> {
		self.token_or_exchange(|| async { Ok(credentials.clone()) }).await
	}

	async fn token_or_exchange<F, Fut>(&self, credentials: F) -> Result<TokenSecret>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<CredentialPair>>,
	{
		if let Some(token) = self.cache.usable() {
			tracing::debug!("Serving cached bearer token.");
			obs::record_token_source(TokenSource::Cache);

			return Ok(token);
		}

		let _refresh = self.cache.lock_refresh().await;

		if let Some(token) = self.cache.usable() {
			tracing::debug!("Bearer token refreshed by a concurrent request.");
			obs::record_token_source(TokenSource::Cache);

			return Ok(token);
		}

		let credentials = credentials().await?;
		let exchange = ClientCredentialsExchange::new(
			&self.token_endpoint,
			&credentials,
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
		)?;
		let token = exchange.exchange().await.inspect_err(|e| {
			tracing::error!(endpoint = %self.token_endpoint, error = %e, "Token exchange failed.")
		})?;

		tracing::info!(expires_at = %token.expires_at, "Issued new bearer token.");
		obs::record_token_source(TokenSource::Exchange);

		let value = token.value.clone();

		self.cache.store(token);

		Ok(value)
	}
}
impl TokenIssuer<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an issuer backed by a reqwest transport with the given timeout.
	pub fn new(token_endpoint: Url, timeout: StdDuration) -> Result<Self> {
		Ok(Self::with_http_client(
			token_endpoint,
			ReqwestHttpClient::new(timeout)?,
			ReqwestTransportErrorMapper,
		))
	}
}
impl<C, M> Debug for TokenIssuer<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("cache", &self.cache)
			.finish()
	}
}
