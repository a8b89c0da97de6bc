pub mod builder;
pub mod rest;
pub mod types;

use crate::core::kernel::{
    ClockSource, ErrorClass, ErrorMatcher, ExchangeProfile, ParamPlacement, PlacementRule,
    RecoveryTable, RetryPolicy, SignatureScheme,
};
use std::time::Duration;

pub use builder::{build_client, build_orchestrator, connect};
pub use rest::AsterFuturesRestClient;
pub use types::{AsterFuturesBalance, AsterFuturesOrder};

pub const DEFAULT_BASE_URL: &str = "https://fapi.asterdex.com";
pub const EXCHANGE_NAME: &str = "aster_futures";

/// Clock offset is refreshed before signed calls once it is this old
pub const CLOCK_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Aster futures: fixed-order HMAC, two resync retries on `-1021`/`-1022`.
///
/// GET parameters travel in the query, everything else as a form body.
pub fn profile() -> ExchangeProfile {
    ExchangeProfile {
        name: EXCHANGE_NAME.to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        scheme: SignatureScheme::futures_fixed_order(),
        clock_source: ClockSource::server_time("/fapi/v1/time"),
        clock_refresh_interval: Some(CLOCK_REFRESH_INTERVAL),
        sync_on_start: true,
        recovery: RecoveryTable::new()
            .rule(ErrorMatcher::Code(-1021), ErrorClass::InvalidTimestamp)
            .rule(ErrorMatcher::Code(-1022), ErrorClass::InvalidSignature),
        retry: RetryPolicy::new(3),
        default_window: None,
        api_key_header: "X-MBX-APIKEY".to_string(),
        placement: PlacementRule::new(ParamPlacement::Query, ParamPlacement::FormBody),
        timeout_seconds: 30,
    }
}
