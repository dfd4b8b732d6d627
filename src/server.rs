//! Inbound HTTP trigger surface.
//!
//! The binary runs as an Azure Functions custom handler: the Functions host forwards each
//! HTTP trigger invocation to [`FUNCTION_ROUTE`] on the port it exports through
//! `FUNCTIONS_CUSTOMHANDLER_PORT`.

// std
use std::net::SocketAddr;
// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	response::{IntoResponse, Response},
	routing::any,
};
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	proxy::{InboundRequest, Proxy, ProxyResponse},
};

/// Route the Functions host forwards the `GetGUID` trigger to.
pub const FUNCTION_ROUTE: &str = "/api/GetGUID";

/// Builds the router serving the proxy on [`FUNCTION_ROUTE`] for any method.
pub fn router<C, M>(proxy: Arc<Proxy<C, M>>) -> Router
where
	C: TokenHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	Router::new().route(FUNCTION_ROUTE, any(handle::<C, M>)).with_state(proxy)
}

/// Binds `0.0.0.0:port` and serves until Ctrl-C.
pub async fn serve<C, M>(proxy: Arc<Proxy<C, M>>, port: u16) -> Result<()>
where
	C: TokenHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	let addr = SocketAddr::from(([0, 0, 0, 0], port));
	let listener = TcpListener::bind(addr).await.map_err(Error::Server)?;

	tracing::info!(
		%addr,
		route = FUNCTION_ROUTE,
		contract = %proxy.contract(),
		"GetGUID proxy listening."
	);

	axum::serve(listener, router(proxy))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(Error::Server)
}

async fn handle<C, M>(
	State(proxy): State<Arc<Proxy<C, M>>>,
	headers: HeaderMap,
	body: Bytes,
) -> ProxyResponse
where
	C: TokenHttpClient,
	M: TransportErrorMapper<C::TransportError>,
{
	tracing::info!("GetGUID proxy processing request.");

	proxy.handle(InboundRequest::new(headers, body)).await
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "Failed to listen for the shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutting down.");
}

impl IntoResponse for ProxyResponse {
	fn into_response(self) -> Response {
		let mut response = (self.status, Json(self.body)).into_response();

		response.headers_mut().extend(self.headers);

		response
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn proxy_response_renders_json_with_headers() {
		let correlation_id = HeaderValue::from_static("corr-9");
		let response =
			ProxyResponse::success(serde_json::json!({"Type": "NINO"}), &correlation_id).into_response();

		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(
			response.headers().get("content-type").and_then(|v| v.to_str().ok()),
			Some("application/json")
		);
		assert_eq!(
			response.headers().get("correlation-id").and_then(|v| v.to_str().ok()),
			Some("corr-9")
		);
	}
}
