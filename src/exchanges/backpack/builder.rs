use crate::core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    kernel::{Ed25519Signer, Orchestrator, OrchestratorBuilder},
};
use crate::exchanges::{apply_config, backpack::rest::BackpackRestClient, sync_on_start};
use std::sync::Arc;

/// Create the Backpack orchestrator.
///
/// `config.api_key` is the base64 public key and `config.secret_key` the base64
/// 32-byte seed; the two must belong together.
pub fn build_orchestrator(config: &ExchangeConfig) -> Result<Orchestrator, ExchangeError> {
    let profile = apply_config(super::profile(), config);
    let mut builder = OrchestratorBuilder::new(profile).with_debug(config.debug);

    if config.has_credentials() {
        let signer = Ed25519Signer::new(config.secret_key(), Some(config.api_key()))?;
        builder = builder.with_signer(Arc::new(signer));
    }

    builder.build()
}

pub fn build_client(config: &ExchangeConfig) -> Result<BackpackRestClient, ExchangeError> {
    Ok(BackpackRestClient::new(build_orchestrator(config)?))
}

pub async fn connect(config: &ExchangeConfig) -> Result<BackpackRestClient, ExchangeError> {
    let client = build_client(config)?;
    sync_on_start(client.orchestrator()).await;
    Ok(client)
}
