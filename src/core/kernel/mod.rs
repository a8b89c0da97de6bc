//! Signing and transport kernel shared by every exchange client
//!
//! The kernel turns a [`RequestDescriptor`] into exact wire bytes, signs them,
//! sends them, and recovers from clock-skew rejections. It holds no
//! exchange-specific logic; exchanges differ only in the [`ExchangeProfile`]
//! they supply.
//!
//! # Components
//!
//! - [`ClockSync`]: offset between the local and exchange clocks
//! - [`canonical`]: byte-exact signing strings per scheme
//! - [`Signer`]: HMAC-SHA256 (hex) and ED25519 (base64) signers
//! - [`SignatureScheme`]: closed set of signing variants and their wire placement
//! - [`Orchestrator`]: dispatch plus the bounded resync-and-retry ladder
//!
//! # Example
//!
//! ```rust,no_run
//! use dexwire::core::kernel::*;
//! use dexwire::exchanges::aster;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), dexwire::ExchangeError> {
//! let signer = Arc::new(HmacSigner::new("api_key".to_string(), "secret".to_string())?);
//! let orchestrator = OrchestratorBuilder::new(aster::profile())
//!     .with_signer(signer)
//!     .build()?;
//!
//! let request = RequestDescriptor::get("/api/v1/account").signed();
//! let account = orchestrator.execute(&request).await?;
//! # Ok(())
//! # }
//! ```
pub mod canonical;
pub mod clock;
pub mod observer;
pub mod orchestrator;
pub mod params;
pub mod profile;
pub mod recovery;
pub mod request;
pub mod rest;
pub mod scheme;
pub mod signer;

// Re-export key types for convenience
pub use clock::{ClockSource, ClockSync};
pub use observer::{DispatchEvent, OutcomeEvent, RequestObserver, RetryEvent, TracingObserver};
pub use orchestrator::{ApiResponse, Orchestrator, OrchestratorBuilder};
pub use params::Params;
pub use profile::{ExchangeProfile, PlacementRule};
pub use recovery::{ErrorClass, ErrorMatcher, RecoveryAction, RecoveryTable, RetryPolicy};
pub use request::{
    ParamPlacement, PreparedRequest, RequestBody, RequestDescriptor, WireBody, WireRequest,
};
pub use rest::{RawResponse, ReqwestRest, RestClientBuilder, RestClientConfig, Transport};
pub use scheme::SignatureScheme;
pub use signer::{Ed25519Signer, HmacSigner, SignatureResult, Signer, SignerKind};
