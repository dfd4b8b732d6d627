//! Azure Functions custom handler entry point for the GetGUID proxy.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use guid_proxy::{
	config::ProxyConfig, obs, proxy::ReqwestProxy, secrets::AwsSecretsManager, server,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ProxyConfig::from_env()?;

	obs::init_tracing(config.log_format);

	let store = Arc::new(AwsSecretsManager::from_config(&config.secret_store).await);
	let proxy = Arc::new(ReqwestProxy::from_config(&config, store)?);

	server::serve(proxy, config.port).await?;

	Ok(())
}
