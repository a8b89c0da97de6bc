use crate::core::{config::ExchangeConfig, errors::ExchangeError, kernel::Orchestrator};
use crate::exchanges::{aster::rest::AsterRestClient, hmac_orchestrator, sync_on_start};

/// Create the Aster spot orchestrator; signed calls need credentials in `config`
pub fn build_orchestrator(config: &ExchangeConfig) -> Result<Orchestrator, ExchangeError> {
    hmac_orchestrator(super::profile(), config)
}

pub fn build_client(config: &ExchangeConfig) -> Result<AsterRestClient, ExchangeError> {
    Ok(AsterRestClient::new(build_orchestrator(config)?))
}

/// Build a client and run the initial clock sync.
///
/// A failed sync is logged and leaves the offset at zero.
pub async fn connect(config: &ExchangeConfig) -> Result<AsterRestClient, ExchangeError> {
    let client = build_client(config)?;
    sync_on_start(client.orchestrator()).await;
    Ok(client)
}
