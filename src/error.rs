//! Proxy-level error types shared across the resolver, issuer, upstream caller, and server.

// self
use crate::_prelude::*;

/// Proxy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical proxy error exposed by public APIs.
///
/// Every downstream failure is wrapped at its origin and surfaces here; the orchestrator is the
/// only place translating it into a transport status via [`Error::status_code`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller supplied a missing or malformed identifier.
	#[error("{reason}")]
	InvalidInput {
		/// Human-readable description of the violation.
		reason: String,
	},
	/// Client credentials could not be read from the secret store.
	#[error("Error retrieving credentials: {0}")]
	CredentialsUnavailable(#[from] CredentialsError),
	/// Client-credentials exchange against the token endpoint failed.
	#[error("Token exchange failed: {0}")]
	TokenExchangeFailed(#[from] TokenExchangeError),
	/// Upstream answered with a non-200 status.
	#[error("Upstream service returned {status}.")]
	UpstreamError {
		/// HTTP status code returned by the upstream.
		status: u16,
		/// Response body preview reported by the upstream.
		body: String,
	},
	/// Upstream could not be reached (DNS, TCP, TLS, timeout).
	#[error("Failed to connect to upstream API: {source}.")]
	UpstreamUnreachable {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// Upstream answered 200 with a body that is not JSON.
	#[error("Upstream service returned malformed JSON.")]
	UpstreamMalformed {
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound listener failure.
	#[error("HTTP server failed.")]
	Server(#[source] std::io::Error),
}
impl Error {
	/// Builds an [`Error::InvalidInput`] from a reason string.
	pub fn invalid_input(reason: impl Into<String>) -> Self {
		Self::InvalidInput { reason: reason.into() }
	}

	/// Wraps an upstream transport failure.
	pub fn upstream_unreachable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::UpstreamUnreachable { source: Box::new(src) }
	}

	/// Returns `true` when the failure is the caller's fault.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::InvalidInput { .. })
	}

	/// Transport status the orchestrator responds with for this failure.
	pub fn status_code(&self) -> StatusCode {
		if self.is_client_error() {
			StatusCode::BAD_REQUEST
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		}
	}
}

/// Secret-store failures raised while resolving client credentials.
#[derive(Debug, ThisError)]
pub enum CredentialsError {
	/// Secret store could not be reached or rejected the request.
	#[error("secret store request failed: {source}")]
	Store {
		/// Store-specific failure.
		#[source]
		source: BoxError,
	},
	/// Secret identifier does not exist.
	#[error("secret `{secret_id}` was not found")]
	SecretNotFound {
		/// Identifier that was looked up.
		secret_id: String,
	},
	/// Secret exists but carries no string payload.
	#[error("secret `{secret_id}` has no string payload")]
	MissingSecretString {
		/// Identifier that was looked up.
		secret_id: String,
	},
	/// Secret payload lacks the expected `client_id`/`secret` fields or is not JSON.
	#[error("secret payload is malformed: {source}")]
	MalformedSecret {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl CredentialsError {
	/// Wraps a store-specific failure.
	pub fn store(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Store { source: Box::new(src) }
	}
}

/// Token endpoint failures raised during the client-credentials exchange.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Token endpoint answered with a non-success status.
	#[error("{}: {body}", rejection_summary(.status))]
	Rejected {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider-reported body (or OAuth error fields).
		body: String,
	},
	/// Token endpoint answered with malformed JSON or omitted `access_token`.
	#[error("token endpoint returned malformed JSON: {source}")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint answered in a shape the OAuth client could not interpret.
	#[error("token endpoint returned an unexpected response: {message}")]
	UnexpectedResponse {
		/// Client-supplied summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Request exceeded the outbound timeout.
	#[error("request to the token endpoint timed out")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("network error occurred while calling the token endpoint: {source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint")]
	Io(#[from] std::io::Error),
	/// Token request could not be constructed.
	#[error("token request could not be built")]
	Request(#[from] oauth2::http::Error),
}
impl TokenExchangeError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status reported by the token endpoint, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. }
			| Self::MalformedResponse { status, .. }
			| Self::UnexpectedResponse { status, .. } => *status,
			_ => None,
		}
	}
}
impl From<ReqwestError> for TokenExchangeError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Configuration and construction failures raised at start-up.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is unset or empty.
	#[error("{name} environment variable is not configured.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Configured URL cannot be parsed or cannot carry path segments.
	#[error("{name} does not hold a usable URL: {value}.")]
	InvalidUrl {
		/// Variable name.
		name: &'static str,
		/// Rejected value.
		value: String,
	},
	/// Configured value is outside the accepted set.
	#[error("{name} has an unsupported value: {value}.")]
	InvalidValue {
		/// Variable name.
		name: &'static str,
		/// Rejected value.
		value: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

fn rejection_summary(status: &Option<u16>) -> String {
	match status {
		Some(code @ (400 | 401)) =>
			format!("token endpoint rejected client authentication (HTTP {code})"),
		Some(code) => format!("token endpoint rejected the request (HTTP {code})"),
		None => "token endpoint rejected the request (no HTTP status)".into(),
	}
}
