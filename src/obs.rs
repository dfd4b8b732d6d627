//! Observability helpers: request spans, subscriber set-up, and optional metrics.
//!
//! # Feature Flags
//!
//! - Spans are always emitted through `tracing`; one `guid_proxy.request` span per inbound
//!   request carries the `contract` and `correlation_id` fields.
//! - Enable `metrics` to increment `guid_proxy_request_total` (labeled by `contract` +
//!   `outcome`) and `guid_proxy_token_total` (labeled by `source`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each inbound request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to the orchestrator.
	Attempt,
	/// `200` returned.
	Success,
	/// `400` returned.
	ClientError,
	/// `500` returned.
	ServerError,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::ClientError => "client_error",
			RequestOutcome::ServerError => "server_error",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where a served bearer token came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// Reused from the in-process cache.
	Cache,
	/// Freshly issued by the token endpoint.
	Exchange,
}
impl TokenSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::Cache => "cache",
			TokenSource::Exchange => "exchange",
		}
	}
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
