// std
use std::sync::Arc;
// crates.io
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use httpmock::prelude::*;
// self
use guid_proxy::{
	config::ProxyConfig,
	proxy::{
		CORRELATION_ID_DEFAULT, Contract, InboundRequest, RESOLVED_FIELD_LABEL, ReqwestProxy,
	},
	secrets::MemorySecretStore,
	url::Url,
};

const SECRET_ID: &str = "consumer/cognito/test/credentials";
const GUID: &str = "123e4567-e89b-12d3-a456-426614174000";
const VALID_SECRET: &str = r#"{"client_id":"client","secret":"secret"}"#;

fn build_proxy(server: &MockServer, contract: Contract, secret_payload: &str) -> ReqwestProxy {
	build_proxy_with_upstream(server, &server.base_url(), contract, secret_payload)
}

fn build_proxy_with_upstream(
	server: &MockServer,
	upstream_base: &str,
	contract: Contract,
	secret_payload: &str,
) -> ReqwestProxy {
	let upstream_base = upstream_base.to_owned();
	let contract_label = contract.to_string();
	let mut config = ProxyConfig::from_lookup(move |name: &str| match name {
		"COGNITO_DOMAIN" => Some("auth.example.com".into()),
		"GUID_API_URL" => Some(upstream_base.clone()),
		"AWS_SECRET_NAME" => Some(SECRET_ID.into()),
		"GUID_CONTRACT" => Some(contract_label.clone()),
		_ => None,
	})
	.expect("Proxy configuration should load for integration tests.");

	config.token_endpoint = Url::parse(&server.url("/oauth2/token"))
		.expect("Mock token endpoint should parse successfully.");

	let store = MemorySecretStore::default().with_secret(SECRET_ID, secret_payload);

	ReqwestProxy::from_config(&config, Arc::new(store))
		.expect("Proxy should build from the test configuration.")
}

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
	let mut map = HeaderMap::new();

	for &(name, value) in pairs {
		map.insert(
			HeaderName::from_static(name),
			HeaderValue::from_str(value).expect("Header fixture should be valid."),
		);
	}

	map
}

fn error_message(body: &serde_json::Value) -> &str {
	body["error"].as_str().expect("Failure body should carry an error string.")
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"upstream-token\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await
}

#[tokio::test]
async fn header_contract_maps_upstream_nino() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let upstream = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/guid-translation-service/v1/dwp-guid")
				.header("authorization", "Bearer upstream-token")
				.header("identifier", GUID)
				.header("correlation-id", "corr-happy");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"guid\":\"{GUID}\",\"nino\":\"AB123456C\"}}"));
		})
		.await;
	let proxy = build_proxy(&server, Contract::HeaderDriven, VALID_SECRET);
	let response = proxy
		.handle(InboundRequest::new(
			headers(&[("identifier", GUID), ("correlation-id", "corr-happy")]),
			"",
		))
		.await;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body["Type"], "NINO");
	assert_eq!(response.body[RESOLVED_FIELD_LABEL], "AB123456C");
	assert_eq!(response.correlation_id(), Some("corr-happy"));

	token.assert_calls_async(1).await;
	upstream.assert_calls_async(1).await;
}

#[tokio::test]
async fn body_contract_returns_upstream_payload_verbatim() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let payload = serde_json::json!({"guid": GUID, "nino": "AB123456C", "status": "ACTIVE"});
	let upstream = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(format!("/nino/{GUID}"))
				.header("authorization", "Bearer upstream-token")
				.header("correlation-id", CORRELATION_ID_DEFAULT);
			then.status(200).header("content-type", "application/json").body(payload.to_string());
		})
		.await;
	let proxy = build_proxy(&server, Contract::BodyDriven, VALID_SECRET);
	let first = proxy
		.handle(InboundRequest::new(HeaderMap::new(), format!(r#"{{"guid":"{GUID}"}}"#)))
		.await;
	let second = proxy
		.handle(InboundRequest::new(HeaderMap::new(), format!(r#"{{"guid":"{GUID}"}}"#)))
		.await;

	assert_eq!(first.status, StatusCode::OK);
	assert_eq!(first.body, payload);
	assert_eq!(first.correlation_id(), Some(CORRELATION_ID_DEFAULT));
	assert_eq!(second.body, payload);

	token.assert_calls_async(1).await;
	upstream.assert_calls_async(2).await;
}

#[tokio::test]
async fn missing_identifier_is_rejected_without_outbound_calls() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let proxy = build_proxy(&server, Contract::HeaderDriven, VALID_SECRET);

	for request_headers in [headers(&[]), headers(&[("identifier", "")])] {
		let response = proxy.handle(InboundRequest::new(request_headers, "")).await;

		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		assert_eq!(error_message(&response.body), "Missing required header: Identifier");
		assert_eq!(response.correlation_id(), Some(CORRELATION_ID_DEFAULT));
	}

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn short_guid_is_rejected_without_outbound_calls() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let proxy = build_proxy(&server, Contract::BodyDriven, VALID_SECRET);
	let response = proxy
		.handle(InboundRequest::new(headers(&[("correlation-id", "c-7")]), r#"{"guid":"abc"}"#))
		.await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert!(error_message(&response.body).contains("guid"));
	assert_eq!(response.correlation_id(), Some("c-7"));

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn malformed_secret_is_a_server_error() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let proxy = build_proxy(&server, Contract::HeaderDriven, r#"{"secret":"secret"}"#);
	let response = proxy.handle(InboundRequest::new(headers(&[("identifier", GUID)]), "")).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(error_message(&response.body).contains("credentials"));

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_token_request_skips_upstream() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let upstream = server
		.mock_async(|when, then| {
			when.method(GET).path("/guid-translation-service/v1/dwp-guid");
			then.status(200).body("{}");
		})
		.await;
	let proxy = build_proxy(&server, Contract::HeaderDriven, VALID_SECRET);
	let response = proxy.handle(InboundRequest::new(headers(&[("identifier", GUID)]), "")).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(error_message(&response.body).contains("401"));
	assert!(proxy.issuer().cache().snapshot().is_none());

	token.assert_calls_async(1).await;
	upstream.assert_calls_async(0).await;
}

#[tokio::test]
async fn upstream_failure_status_is_reported() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let _upstream = server
		.mock_async(|when, then| {
			when.method(GET).path("/guid-translation-service/v1/dwp-guid");
			then.status(404).body("not found");
		})
		.await;
	let proxy = build_proxy(&server, Contract::HeaderDriven, VALID_SECRET);
	let response = proxy
		.handle(InboundRequest::new(
			headers(&[("identifier", GUID), ("correlation-id", "corr-404")]),
			"",
		))
		.await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(error_message(&response.body).contains("404"));
	assert_eq!(response.correlation_id(), Some("corr-404"));
}

#[tokio::test]
async fn upstream_non_json_body_is_a_server_error() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let _upstream = server
		.mock_async(|when, then| {
			when.method(GET).path("/guid-translation-service/v1/dwp-guid");
			then.status(200).body("<html>ok</html>");
		})
		.await;
	let proxy = build_proxy(&server, Contract::HeaderDriven, VALID_SECRET);
	let response = proxy.handle(InboundRequest::new(headers(&[("identifier", GUID)]), "")).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(error_message(&response.body).contains("malformed"));
}

#[tokio::test]
async fn unreachable_upstream_is_a_server_error() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let proxy = build_proxy_with_upstream(
		&server,
		"http://127.0.0.1:1",
		Contract::HeaderDriven,
		VALID_SECRET,
	);
	let response = proxy.handle(InboundRequest::new(headers(&[("identifier", GUID)]), "")).await;

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(error_message(&response.body).contains("Failed to connect to upstream API"));

	// Token stays cached for the next request even though the upstream call failed.
	assert!(proxy.issuer().cache().usable().is_some());

	token.assert_calls_async(1).await;
}
