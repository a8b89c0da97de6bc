//! Signing and transport core for the Aster (spot and futures) and Backpack
//! REST APIs.
//!
//! Every exchange is described by an [`ExchangeProfile`]; a single
//! [`Orchestrator`] signs, sends and retries calls for any profile.

pub mod core;
pub mod exchanges;
pub mod utils;

pub use crate::core::config::{ConfigError, ExchangeConfig};
pub use crate::core::errors::{ErrorPayload, ExchangeError};
pub use crate::core::kernel::{
    ApiResponse, ClockSource, ClockSync, Ed25519Signer, ExchangeProfile, HmacSigner,
    Orchestrator, OrchestratorBuilder, Params, RequestDescriptor, SignatureScheme, Signer,
};
pub use crate::exchanges::aster::AsterRestClient;
pub use crate::exchanges::aster_futures::AsterFuturesRestClient;
pub use crate::exchanges::backpack::BackpackRestClient;
