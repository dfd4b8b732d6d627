//! Environment-style configuration for the proxy process.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError, obs::LogFormat, proxy::Contract};

/// Default AWS region hosting the credential secret.
pub const DEFAULT_AWS_REGION: &str = "eu-west-2";
/// Default secret identifier holding the Cognito client credentials.
pub const DEFAULT_SECRET_NAME: &str = "consumer/cognito/vpn-lab/credentials";
/// Default listener port when the Functions host does not provide one.
pub const DEFAULT_PORT: u16 = 3000;
/// Fixed timeout applied to every outbound call.
pub const OUTBOUND_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Location of (and credentials for) the secret store.
#[derive(Clone, Debug)]
pub struct SecretStoreConfig {
	/// Static access key; falls back to the SDK credential chain when unset.
	pub access_key_id: Option<TokenSecret>,
	/// Static secret key; falls back to the SDK credential chain when unset.
	pub secret_access_key: Option<TokenSecret>,
	/// Region hosting the secret.
	pub region: String,
	/// Secret identifier.
	pub secret_name: String,
}

/// Full proxy configuration.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
	/// Secret store settings.
	pub secret_store: SecretStoreConfig,
	/// OAuth token endpoint (`https://<COGNITO_DOMAIN>/oauth2/token`).
	pub token_endpoint: Url,
	/// Upstream GUID translation base URL.
	pub upstream_base_url: Url,
	/// Inbound request contract served by this deployment.
	pub contract: Contract,
	/// Timeout applied to token and upstream calls.
	pub timeout: StdDuration,
	/// Listener port.
	pub port: u16,
	/// Log output format.
	pub log_format: LogFormat,
}
impl ProxyConfig {
	/// Reads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads configuration through `lookup`; empty values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
		let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVar { name });
		let secret_store = SecretStoreConfig {
			access_key_id: var("AWS_ACCESS_KEY_ID").map(TokenSecret::new),
			secret_access_key: var("AWS_SECRET_ACCESS_KEY").map(TokenSecret::new),
			region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.into()),
			secret_name: var("AWS_SECRET_NAME").unwrap_or_else(|| DEFAULT_SECRET_NAME.into()),
		};
		let token_endpoint = token_endpoint(&required("COGNITO_DOMAIN")?)?;
		let upstream_base_url = parse_url("GUID_API_URL", &required("GUID_API_URL")?)?;
		let contract = match var("GUID_CONTRACT") {
			Some(value) => Contract::from_str(&value)
				.map_err(|_| ConfigError::InvalidValue { name: "GUID_CONTRACT", value })?,
			None => Contract::default(),
		};
		let port = match var("FUNCTIONS_CUSTOMHANDLER_PORT") {
			Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
				name: "FUNCTIONS_CUSTOMHANDLER_PORT",
				value,
			})?,
			None => DEFAULT_PORT,
		};
		let log_format = match var("LOG_FORMAT") {
			Some(value) => LogFormat::from_str(&value)
				.map_err(|_| ConfigError::InvalidValue { name: "LOG_FORMAT", value })?,
			None => LogFormat::default(),
		};

		Ok(Self {
			secret_store,
			token_endpoint,
			upstream_base_url,
			contract,
			timeout: OUTBOUND_TIMEOUT,
			port,
			log_format,
		})
	}
}

fn token_endpoint(domain: &str) -> Result<Url, ConfigError> {
	let host = domain.trim_start_matches("https://").trim_end_matches('/');

	parse_url("COGNITO_DOMAIN", &format!("https://{host}/oauth2/token"))
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
	match Url::parse(value) {
		Ok(url) if !url.cannot_be_a_base() => Ok(url),
		_ => Err(ConfigError::InvalidUrl { name, value: value.to_owned() }),
	}
}
