// crates.io
use tracing::{Instrument, instrument::Instrumented};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{_prelude::*, proxy::Contract};

const DEFAULT_FILTER: &str = "guid_proxy=info";

/// Log line format selected by `LOG_FORMAT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
	/// Human-readable lines for local runs.
	#[default]
	Pretty,
	/// One JSON object per line for log ingestion.
	Json,
}
impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"pretty" | "text" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			_ => Err(s.to_owned()),
		}
	}
}

/// Installs the global subscriber; `RUST_LOG` overrides the default `guid_proxy=info` filter.
///
/// Returns `false` when a subscriber was already installed (e.g. by a test harness).
pub fn init_tracing(format: LogFormat) -> bool {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
	let registry = tracing_subscriber::registry().with(filter);

	match format {
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init().is_ok(),
		LogFormat::Json =>
			registry.with(tracing_subscriber::fmt::layer().json()).try_init().is_ok(),
	}
}

/// Span wrapping the handling of one inbound request.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the contract and correlation id.
	pub fn new(contract: Contract, correlation_id: &str) -> Self {
		let span =
			tracing::info_span!("guid_proxy.request", contract = contract.as_str(), correlation_id);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
