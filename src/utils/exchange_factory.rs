use crate::core::{config::ExchangeConfig, errors::ExchangeError, kernel::Orchestrator};
use crate::exchanges::{aster, aster_futures, backpack};
use std::str::FromStr;

/// Supported exchange types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeType {
    Aster,
    AsterFutures,
    Backpack,
}

impl ExchangeType {
    pub const ALL: [Self; 3] = [Self::Aster, Self::AsterFutures, Self::Backpack];

    /// Prefix used for `{PREFIX}_API_KEY` style environment variables
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::Aster => "ASTER",
            Self::AsterFutures => "ASTER_FUTURES",
            Self::Backpack => "BACKPACK",
        }
    }
}

impl std::fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aster => write!(f, "Aster"),
            Self::AsterFutures => write!(f, "Aster Futures"),
            Self::Backpack => write!(f, "Backpack"),
        }
    }
}

impl FromStr for ExchangeType {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "aster" | "aster_spot" => Ok(Self::Aster),
            "aster_futures" | "aster_perp" => Ok(Self::AsterFutures),
            "backpack" => Ok(Self::Backpack),
            other => Err(ExchangeError::InvalidParameters(format!(
                "unknown exchange '{}'",
                other
            ))),
        }
    }
}

/// Factory for creating exchange orchestrators
pub struct ExchangeFactory;

impl ExchangeFactory {
    /// Create an orchestrator for the given exchange; `None` means public endpoints only
    pub fn create_orchestrator(
        exchange_type: ExchangeType,
        config: Option<ExchangeConfig>,
    ) -> Result<Orchestrator, ExchangeError> {
        let cfg = config.unwrap_or_else(ExchangeConfig::read_only);
        match exchange_type {
            ExchangeType::Aster => aster::build_orchestrator(&cfg),
            ExchangeType::AsterFutures => aster_futures::build_orchestrator(&cfg),
            ExchangeType::Backpack => backpack::build_orchestrator(&cfg),
        }
    }

    /// Create an orchestrator from `{PREFIX}_*` environment variables
    pub fn from_env(exchange_type: ExchangeType) -> Result<Orchestrator, ExchangeError> {
        let cfg = ExchangeConfig::from_env(exchange_type.env_prefix())?;
        Self::create_orchestrator(exchange_type, Some(cfg))
    }
}
