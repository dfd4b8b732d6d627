//! AWS Secrets Manager backend for [`SecretStore`].

// crates.io
use aws_config::{BehaviorVersion, Region, retry::RetryConfig};
use aws_credential_types::Credentials;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
// self
use crate::{
	_prelude::*,
	config::SecretStoreConfig,
	error::CredentialsError,
	secrets::{SecretFuture, SecretStore},
};

/// Secrets Manager client bound to a single region.
#[derive(Clone, Debug)]
pub struct AwsSecretsManager {
	client: SecretsManagerClient,
}
impl AwsSecretsManager {
	/// Wraps an already configured SDK client.
	pub fn with_client(client: SecretsManagerClient) -> Self {
		Self { client }
	}

	/// Builds a client for the configured region.
	///
	/// Static keys are used when both `access_key_id` and `secret_access_key` are configured;
	/// otherwise the SDK's default credential chain applies. SDK retries are disabled so a
	/// failing store surfaces immediately to the caller.
	pub async fn from_config(config: &SecretStoreConfig) -> Self {
		let mut loader = aws_config::defaults(BehaviorVersion::latest())
			.region(Region::new(config.region.clone()))
			.retry_config(RetryConfig::disabled());

		if let (Some(access_key), Some(secret_key)) =
			(config.access_key_id.as_ref(), config.secret_access_key.as_ref())
		{
			loader = loader.credentials_provider(Credentials::new(
				access_key.expose(),
				secret_key.expose(),
				None,
				None,
				"environment",
			));
		}

		let sdk_config = loader.load().await;

		Self::with_client(SecretsManagerClient::new(&sdk_config))
	}
}
impl SecretStore for AwsSecretsManager {
	fn secret_string<'a>(&'a self, secret_id: &'a str) -> SecretFuture<'a, String> {
		Box::pin(async move {
			let output = self
				.client
				.get_secret_value()
				.secret_id(secret_id)
				.send()
				.await
				.map_err(|err| match err.into_service_error() {
					err if err.is_resource_not_found_exception() =>
						CredentialsError::SecretNotFound { secret_id: secret_id.to_owned() },
					err => CredentialsError::store(err),
				})?;

			output.secret_string().map(str::to_owned).ok_or_else(|| {
				CredentialsError::MissingSecretString { secret_id: secret_id.to_owned() }
			})
		})
	}
}
