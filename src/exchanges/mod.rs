pub mod aster;
pub mod aster_futures;
pub mod backpack;

use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ExchangeProfile, HmacSigner, Orchestrator, OrchestratorBuilder};
use std::sync::Arc;

/// Apply user overrides (base URL, timeout) to an exchange profile
pub(crate) fn apply_config(mut profile: ExchangeProfile, config: &ExchangeConfig) -> ExchangeProfile {
    if let Some(base_url) = &config.base_url {
        profile = profile.with_base_url(base_url.clone());
    }
    if let Some(timeout) = config.timeout_seconds {
        profile = profile.with_timeout(timeout);
    }
    profile
}

/// Orchestrator for an HMAC profile, signing only when `config` carries credentials
pub(crate) fn hmac_orchestrator(
    profile: ExchangeProfile,
    config: &ExchangeConfig,
) -> Result<Orchestrator, ExchangeError> {
    let mut builder =
        OrchestratorBuilder::new(apply_config(profile, config)).with_debug(config.debug);

    // Add authentication if available
    if config.has_credentials() {
        let signer = HmacSigner::new(
            config.api_key().to_string(),
            config.secret_key().to_string(),
        )?;
        builder = builder.with_signer(Arc::new(signer));
    }

    builder.build()
}

/// Initial clock sync for profiles that ask for one
pub(crate) async fn sync_on_start(orchestrator: &Orchestrator) {
    if orchestrator.profile().sync_on_start {
        orchestrator.warm_up().await;
    }
}
