pub mod builder;
pub mod rest;
pub mod types;

use crate::core::kernel::{
    ClockSource, ErrorClass, ErrorMatcher, ExchangeProfile, PlacementRule, RecoveryTable,
    RetryPolicy, SignatureScheme,
};

pub use builder::{build_client, build_orchestrator, connect};
pub use rest::AsterRestClient;
pub use types::{AsterNewOrder, AsterServerTime};

pub const DEFAULT_BASE_URL: &str = "https://sapi.asterdex.com";
pub const EXCHANGE_NAME: &str = "aster";

/// Aster spot: insertion-order HMAC, one resync retry on `-1021`
pub fn profile() -> ExchangeProfile {
    ExchangeProfile {
        name: EXCHANGE_NAME.to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        scheme: SignatureScheme::HmacOrdered,
        clock_source: ClockSource::server_time("/api/v1/time"),
        clock_refresh_interval: None,
        sync_on_start: true,
        recovery: RecoveryTable::new().rule(ErrorMatcher::Code(-1021), ErrorClass::InvalidTimestamp),
        retry: RetryPolicy::new(2),
        default_window: Some(5000),
        api_key_header: "X-MBX-APIKEY".to_string(),
        placement: PlacementRule::query_only(),
        timeout_seconds: 15,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorPayload;
    use crate::core::kernel::ParamPlacement;
    use reqwest::Method;

    #[test]
    fn test_profile_defaults() {
        let profile = profile();
        assert_eq!(profile.base_url, DEFAULT_BASE_URL);
        assert_eq!(profile.retry.max_attempts, 2);
        assert_eq!(profile.default_window, Some(5000));
        assert_eq!(profile.placement.for_method(&Method::POST), ParamPlacement::Query);
        assert!(profile.sync_on_start);
    }

    #[test]
    fn test_only_timestamp_rejection_is_recoverable() {
        let profile = profile();
        let stale = ErrorPayload::from_body(r#"{"code":-1021,"msg":"Timestamp outside recvWindow"}"#);
        let bad_sig = ErrorPayload::from_body(r#"{"code":-1022,"msg":"Signature invalid"}"#);
        assert!(profile.recovery.classify(&stale).is_some());
        assert!(profile.recovery.classify(&bad_sig).is_none());
    }
}
