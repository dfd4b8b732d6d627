//! Thread-safe in-memory [`SecretStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	error::CredentialsError,
	secrets::{SecretFuture, SecretStore},
};

/// Keeps secret payloads in-process, keyed by secret identifier.
#[derive(Clone, Debug, Default)]
pub struct MemorySecretStore(Arc<RwLock<HashMap<String, String>>>);
impl MemorySecretStore {
	/// Adds or replaces a payload and returns the store for chaining.
	pub fn with_secret(self, secret_id: impl Into<String>, payload: impl Into<String>) -> Self {
		self.insert(secret_id, payload);

		self
	}

	/// Adds or replaces a payload.
	pub fn insert(&self, secret_id: impl Into<String>, payload: impl Into<String>) {
		self.0.write().insert(secret_id.into(), payload.into());
	}

	fn fetch_now(&self, secret_id: &str) -> Result<String, CredentialsError> {
		self.0
			.read()
			.get(secret_id)
			.cloned()
			.ok_or_else(|| CredentialsError::SecretNotFound { secret_id: secret_id.to_owned() })
	}
}
impl SecretStore for MemorySecretStore {
	fn secret_string<'a>(&'a self, secret_id: &'a str) -> SecretFuture<'a, String> {
		let result = self.fetch_now(secret_id);

		Box::pin(async move { result })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn missing_secret_reports_not_found() {
		let store = MemorySecretStore::default().with_secret("present", "{}");
		let err = store
			.secret_string("absent")
			.await
			.expect_err("Unknown secret identifiers should fail.");

		assert!(matches!(
			err,
			CredentialsError::SecretNotFound { ref secret_id } if secret_id == "absent"
		));
		assert_eq!(
			store.secret_string("present").await.expect("Stored secret should be returned."),
			"{}"
		);
	}
}
