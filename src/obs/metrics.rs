// self
use crate::{
	obs::{RequestOutcome, TokenSource},
	proxy::Contract,
};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(contract: Contract, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"guid_proxy_request_total",
			"contract" => contract.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (contract, outcome);
	}
}

/// Records where a served token came from (when enabled).
pub fn record_token_source(source: TokenSource) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("guid_proxy_token_total", "source" => source.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = source;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_request_outcome(Contract::HeaderDriven, RequestOutcome::ServerError);
		record_token_source(TokenSource::Exchange);
	}
}
