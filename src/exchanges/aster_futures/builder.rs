use crate::core::{config::ExchangeConfig, errors::ExchangeError, kernel::Orchestrator};
use crate::exchanges::{
    aster_futures::rest::AsterFuturesRestClient, hmac_orchestrator, sync_on_start,
};

/// Create the Aster futures orchestrator; signed calls need credentials in `config`
pub fn build_orchestrator(config: &ExchangeConfig) -> Result<Orchestrator, ExchangeError> {
    hmac_orchestrator(super::profile(), config)
}

pub fn build_client(config: &ExchangeConfig) -> Result<AsterFuturesRestClient, ExchangeError> {
    Ok(AsterFuturesRestClient::new(build_orchestrator(config)?))
}

/// Build a client and run the initial clock sync
pub async fn connect(config: &ExchangeConfig) -> Result<AsterFuturesRestClient, ExchangeError> {
    let client = build_client(config)?;
    sync_on_start(client.orchestrator()).await;
    Ok(client)
}
