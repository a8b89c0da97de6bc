use crate::core::kernel::clock::ClockSource;
use crate::core::kernel::recovery::{RecoveryTable, RetryPolicy};
use crate::core::kernel::request::ParamPlacement;
use crate::core::kernel::scheme::SignatureScheme;
use reqwest::Method;
use std::time::Duration;

/// Default parameter placement by HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRule {
    pub get: ParamPlacement,
    pub other: ParamPlacement,
}

impl PlacementRule {
    pub const fn new(get: ParamPlacement, other: ParamPlacement) -> Self {
        Self { get, other }
    }

    /// Every method sends its parameters in the query string
    pub const fn query_only() -> Self {
        Self::new(ParamPlacement::Query, ParamPlacement::Query)
    }

    pub fn for_method(&self, method: &Method) -> ParamPlacement {
        if *method == Method::GET {
            self.get
        } else {
            self.other
        }
    }
}

/// Everything that distinguishes one exchange's signing and transport rules.
///
/// Profiles are plain data: supporting a new exchange means writing a new
/// profile, not new control flow.
#[derive(Debug, Clone)]
pub struct ExchangeProfile {
    pub name: String,
    pub base_url: String,
    pub scheme: SignatureScheme,
    pub clock_source: ClockSource,
    /// Periodic refresh before signed calls; `None` disables it
    pub clock_refresh_interval: Option<Duration>,
    /// Best-effort clock sync when a client is connected
    pub sync_on_start: bool,
    pub recovery: RecoveryTable,
    pub retry: RetryPolicy,
    /// Window applied when the caller does not set one
    pub default_window: Option<u64>,
    /// Header carrying the API key for HMAC schemes
    pub api_key_header: String,
    pub placement: PlacementRule,
    pub timeout_seconds: u64,
}

impl ExchangeProfile {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_clock_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.clock_refresh_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_by_method() {
        let rule = PlacementRule::new(ParamPlacement::Query, ParamPlacement::FormBody);
        assert_eq!(rule.for_method(&Method::GET), ParamPlacement::Query);
        assert_eq!(rule.for_method(&Method::DELETE), ParamPlacement::FormBody);
        assert_eq!(
            PlacementRule::query_only().for_method(&Method::POST),
            ParamPlacement::Query
        );
    }
}
