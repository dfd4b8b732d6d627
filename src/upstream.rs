//! Authenticated calls to the upstream GUID translation service.

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	http::body_preview,
	proxy::{Contract, LookupRequest},
};

/// Header carrying the identifier in the header-driven contract.
pub const IDENTIFIER_HEADER: &str = "Identifier";
/// Header carrying the caller's correlation id.
pub const CORRELATION_ID_HEADER: &str = "correlation-id";

/// Path appended to the base URL by the header-driven contract.
const DWP_GUID_PATH: [&str; 3] = ["guid-translation-service", "v1", "dwp-guid"];
/// Path segment preceding the GUID in the body-driven contract.
const NINO_PATH: &str = "nino";

/// GET client for the upstream lookup endpoint.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
	client: ReqwestClient,
	base_url: Url,
	contract: Contract,
}
impl UpstreamClient {
	/// Builds a client for `base_url` whose requests time out after `timeout`.
	pub fn new(base_url: Url, contract: Contract, timeout: StdDuration) -> Result<Self> {
		let client = ReqwestClient::builder().timeout(timeout).build().map_err(ConfigError::from)?;

		Ok(Self::with_client(client, base_url, contract))
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient, base_url: Url, contract: Contract) -> Self {
		Self { client, base_url, contract }
	}

	/// Final lookup URL for `request` under the configured contract.
	pub fn lookup_url(&self, request: &LookupRequest) -> Result<Url> {
		let mut url = self.base_url.clone();

		{
			let mut segments = url.path_segments_mut().map_err(|_| ConfigError::InvalidUrl {
				name: "GUID_API_URL",
				value: self.base_url.to_string(),
			})?;

			segments.pop_if_empty();

			match self.contract {
				Contract::HeaderDriven => {
					segments.extend(DWP_GUID_PATH);
				},
				Contract::BodyDriven => {
					segments.push(NINO_PATH).push(&request.identifier);
				},
			}
		}

		Ok(url)
	}

	/// Issues the lookup and returns the decoded JSON payload unmodified.
	pub async fn lookup(&self, token: &TokenSecret, request: &LookupRequest) -> Result<JsonValue> {
		let url = self.lookup_url(request)?;

		tracing::info!(%url, "Calling upstream GUID API.");

		let mut builder = self
			.client
			.get(url)
			.header(AUTHORIZATION, format!("Bearer {}", token.expose()))
			.header(CORRELATION_ID_HEADER, request.correlation_id.clone());

		if self.contract == Contract::HeaderDriven {
			builder = builder.header(IDENTIFIER_HEADER, request.identifier.as_str());
		}

		let response = builder.send().await.map_err(|e| {
			tracing::error!(error = %e, "HTTP connection error.");

			Error::upstream_unreachable(e)
		})?;
		let status = response.status();
		let body = response.bytes().await.map_err(Error::upstream_unreachable)?;

		if status != StatusCode::OK {
			let body = body_preview(&body);

			tracing::error!(status = status.as_u16(), %body, "Upstream error.");

			return Err(Error::UpstreamError { status: status.as_u16(), body });
		}

		serde_json::from_slice(&body).map_err(|source| Error::UpstreamMalformed { source })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn client(base: &str, contract: Contract) -> UpstreamClient {
		UpstreamClient::new(
			Url::parse(base).expect("Base URL fixture should parse."),
			contract,
			StdDuration::from_secs(10),
		)
		.expect("Upstream client should build.")
	}

	fn request(identifier: &str) -> LookupRequest {
		LookupRequest {
			identifier: identifier.into(),
			correlation_id: HeaderValue::from_static("corr-1"),
		}
	}

	#[test]
	fn header_contract_uses_fixed_path() {
		let url = client("https://guid.example.com/", Contract::HeaderDriven)
			.lookup_url(&request("ignored"))
			.expect("Lookup URL should build.");

		assert_eq!(url.as_str(), "https://guid.example.com/guid-translation-service/v1/dwp-guid");
	}

	#[test]
	fn body_contract_appends_guid_segment() {
		let url = client("https://guid.example.com/api", Contract::BodyDriven)
			.lookup_url(&request("123e4567-e89b-12d3-a456-426614174000"))
			.expect("Lookup URL should build.");

		assert_eq!(
			url.as_str(),
			"https://guid.example.com/api/nino/123e4567-e89b-12d3-a456-426614174000"
		);
	}

	#[test]
	fn body_contract_escapes_path_separators() {
		let url = client("https://guid.example.com", Contract::BodyDriven)
			.lookup_url(&request("../../admin/0123456789abcdef0123456789"))
			.expect("Lookup URL should build.");

		assert!(url.path().starts_with("/nino/"));
		assert_eq!(url.path_segments().map(Iterator::count), Some(2));
	}
}
