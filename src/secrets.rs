//! Secret-store contract and the credential resolver built on top of it.

pub mod aws;
pub mod memory;

pub use aws::AwsSecretsManager;
pub use memory::MemorySecretStore;

// self
use crate::{_prelude::*, auth::CredentialPair, error::CredentialsError};

/// Boxed future returned by [`SecretStore`] implementations.
pub type SecretFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, CredentialsError>> + 'a + Send>>;

/// Backend contract for stores that hold the OAuth client secret payload.
pub trait SecretStore
where
	Self: Send + Sync,
{
	/// Fetches the raw string payload stored under `secret_id`.
	fn secret_string<'a>(&'a self, secret_id: &'a str) -> SecretFuture<'a, String>;
}

/// Resolves the client credential pair from a named secret.
///
/// The resolver keeps no cache of its own; the issuer calls it only on a token cache miss.
#[derive(Clone)]
pub struct CredentialResolver {
	store: Arc<dyn SecretStore>,
	secret_id: String,
}
impl CredentialResolver {
	/// Creates a resolver reading `secret_id` from `store`.
	pub fn new(store: Arc<dyn SecretStore>, secret_id: impl Into<String>) -> Self {
		Self { store, secret_id: secret_id.into() }
	}

	/// Secret identifier this resolver reads.
	pub fn secret_id(&self) -> &str {
		&self.secret_id
	}

	/// Reads and parses the credential pair.
	pub async fn resolve(&self) -> Result<CredentialPair> {
		let raw = self.store.secret_string(&self.secret_id).await.inspect_err(|e| {
			tracing::error!(secret_id = %self.secret_id, error = %e, "Error retrieving credentials.")
		})?;
		let credentials = parse_payload(&raw).inspect_err(|e| {
			tracing::error!(secret_id = %self.secret_id, error = %e, "Secret payload is malformed.")
		})?;

		tracing::debug!(secret_id = %self.secret_id, "Resolved client credentials.");

		Ok(credentials)
	}
}
impl Debug for CredentialResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialResolver").field("secret_id", &self.secret_id).finish()
	}
}

#[derive(Deserialize)]
struct SecretPayload {
	client_id: String,
	secret: String,
}

/// Parses the `{"client_id": "...", "secret": "..."}` payload.
pub(crate) fn parse_payload(raw: &str) -> Result<CredentialPair, CredentialsError> {
	let mut de = serde_json::Deserializer::from_str(raw);
	let payload: SecretPayload = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| CredentialsError::MalformedSecret { source })?;

	Ok(CredentialPair::new(payload.client_id, payload.secret))
}
