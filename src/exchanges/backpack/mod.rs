pub mod builder;
pub mod rest;
pub mod types;

use crate::core::kernel::{
    ClockSource, ErrorClass, ErrorMatcher, ExchangeProfile, ParamPlacement, PlacementRule,
    RecoveryTable, RetryPolicy, SignatureScheme,
};

pub use builder::{build_client, build_orchestrator, connect};
pub use rest::BackpackRestClient;
pub use types::{BackpackCancelOrder, BackpackMarket, BackpackOrderRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.backpack.exchange";
pub const EXCHANGE_NAME: &str = "backpack";

pub const DEFAULT_WINDOW_MS: u64 = 30_000;
/// Window used on the last retry after repeated `expired` rejections
pub const WIDENED_WINDOW_MS: u64 = 60_000;

/// Backpack: ED25519 instruction signing with headers, clock read from the
/// `Date` header of the public markets endpoint.
pub fn profile() -> ExchangeProfile {
    ExchangeProfile {
        name: EXCHANGE_NAME.to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        scheme: SignatureScheme::Ed25519,
        clock_source: ClockSource::date_header("/api/v1/markets"),
        clock_refresh_interval: None,
        sync_on_start: false,
        recovery: RecoveryTable::new().rule(
            ErrorMatcher::MessageContains("expired".to_string()),
            ErrorClass::InvalidTimestamp,
        ),
        retry: RetryPolicy::new(3).with_widened_window(WIDENED_WINDOW_MS),
        default_window: Some(DEFAULT_WINDOW_MS),
        api_key_header: crate::core::kernel::scheme::ED25519_KEY_HEADER.to_string(),
        placement: PlacementRule::new(ParamPlacement::Query, ParamPlacement::JsonBody),
        timeout_seconds: 15,
    }
}
