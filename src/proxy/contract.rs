//! Inbound request contracts: where the identifier comes from and how the payload is mapped.

// std
use std::borrow::Cow;
// self
use crate::{
	_prelude::*,
	upstream::{CORRELATION_ID_HEADER, IDENTIFIER_HEADER},
};

/// Correlation id used when the caller does not supply one.
pub const CORRELATION_ID_DEFAULT: &str = "not-provided";
/// Minimum length of a GUID-shaped identifier in the body-driven contract.
pub const MIN_GUID_LEN: usize = 32;
/// Discriminator written into the header-driven response.
pub const IDENTIFIER_TYPE: &str = "NINO";
/// Label of the resolved value in the header-driven response.
pub const RESOLVED_FIELD_LABEL: &str = "Returned identifier of the type specified in the type field";
/// Value reported when the upstream payload has no `nino` field.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Request contract served by one deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Contract {
	/// Identifier in the `Identifier` header; response mapped to the fixed NINO shape.
	#[default]
	HeaderDriven,
	/// Identifier in the JSON body `guid` field; upstream payload returned verbatim.
	BodyDriven,
}
impl Contract {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Contract::HeaderDriven => "header",
			Contract::BodyDriven => "body",
		}
	}

	/// Extracts and validates the lookup request.
	pub fn extract(self, headers: &HeaderMap, body: &[u8]) -> Result<LookupRequest> {
		let correlation_id = correlation_id(headers);
		let identifier = match self {
			Contract::HeaderDriven => header_identifier(headers)?,
			Contract::BodyDriven => body_identifier(body)?,
		};

		Ok(LookupRequest { identifier, correlation_id })
	}

	/// Maps the upstream payload into the outbound response body.
	pub fn map_payload(self, payload: JsonValue) -> JsonValue {
		match self {
			Contract::HeaderDriven => {
				let resolved = payload
					.get("nino")
					.cloned()
					.unwrap_or_else(|| JsonValue::String(NOT_FOUND.into()));
				let mut mapped = serde_json::Map::new();

				mapped.insert("Type".into(), JsonValue::String(IDENTIFIER_TYPE.into()));
				mapped.insert(RESOLVED_FIELD_LABEL.into(), resolved);

				JsonValue::Object(mapped)
			},
			Contract::BodyDriven => payload,
		}
	}
}
impl Display for Contract {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Contract {
	type Err = UnknownContract;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"header" => Ok(Contract::HeaderDriven),
			"body" => Ok(Contract::BodyDriven),
			_ => Err(UnknownContract(s.to_owned())),
		}
	}
}

/// Error returned when parsing an unsupported contract label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown request contract `{0}`.")]
pub struct UnknownContract(pub String);

/// Validated per-call lookup input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupRequest {
	/// Subject to resolve.
	pub identifier: String,
	/// Caller-supplied tracing id as received, or [`CORRELATION_ID_DEFAULT`].
	pub correlation_id: HeaderValue,
}

/// Reads the caller's correlation id byte for byte, falling back to [`CORRELATION_ID_DEFAULT`]
/// only when the header is absent or empty.
pub fn correlation_id(headers: &HeaderMap) -> HeaderValue {
	headers
		.get(CORRELATION_ID_HEADER)
		.filter(|value| !value.is_empty())
		.cloned()
		.unwrap_or_else(|| HeaderValue::from_static(CORRELATION_ID_DEFAULT))
}

/// Lossy text rendering of a correlation id for log and span fields.
pub fn correlation_label(value: &HeaderValue) -> Cow<'_, str> {
	String::from_utf8_lossy(value.as_bytes())
}

fn header_identifier(headers: &HeaderMap) -> Result<String> {
	let value = headers
		.get(IDENTIFIER_HEADER)
		.filter(|value| !value.is_empty())
		.ok_or_else(|| Error::invalid_input("Missing required header: Identifier"))?;
	let identifier = value
		.to_str()
		.map_err(|_| Error::invalid_input("Header Identifier must be visible ASCII"))?;

	Ok(identifier.to_owned())
}

#[derive(Deserialize)]
struct LookupBody {
	guid: Option<JsonValue>,
}

fn body_identifier(body: &[u8]) -> Result<String> {
	let parsed: LookupBody = serde_json::from_slice(body)
		.map_err(|_| Error::invalid_input("Request body must be a JSON object"))?;

	match parsed.guid {
		None | Some(JsonValue::Null) => Err(Error::invalid_input("Missing required field: guid")),
		Some(JsonValue::String(guid)) if guid.chars().count() >= MIN_GUID_LEN => Ok(guid),
		Some(_) => Err(Error::invalid_input(format!(
			"Field guid must be a string of at least {MIN_GUID_LEN} characters"
		))),
	}
}
