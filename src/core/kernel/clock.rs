use crate::core::errors::ExchangeError;
use crate::core::kernel::request::WireRequest;
use crate::core::kernel::rest::{RawResponse, Transport};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Where the authoritative time comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockSource {
    /// JSON endpoint exposing the server time in milliseconds under `field`
    ServerTime { path: String, field: String },
    /// The `Date` header of any response from `path`
    DateHeader { path: String },
}

impl ClockSource {
    pub fn server_time(path: impl Into<String>) -> Self {
        Self::ServerTime {
            path: path.into(),
            field: "serverTime".to_string(),
        }
    }

    pub fn date_header(path: impl Into<String>) -> Self {
        Self::DateHeader { path: path.into() }
    }

    fn path(&self) -> &str {
        match self {
            Self::ServerTime { path, .. } | Self::DateHeader { path } => path,
        }
    }

    /// Extract the server time in milliseconds from a probe response
    pub fn read_server_millis(&self, response: &RawResponse) -> Result<i64, ExchangeError> {
        match self {
            Self::ServerTime { field, .. } => {
                if !(200..300).contains(&response.status) {
                    return Err(ExchangeError::ClockSync(format!(
                        "time endpoint returned HTTP {}",
                        response.status
                    )));
                }
                let value: Value = serde_json::from_str(&response.body).map_err(|e| {
                    ExchangeError::ClockSync(format!("time endpoint returned invalid JSON: {}", e))
                })?;
                match value.get(field) {
                    Some(Value::Number(n)) => n.as_i64(),
                    Some(Value::String(s)) => s.parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| {
                    ExchangeError::ClockSync(format!("time response has no numeric '{}'", field))
                })
            }
            Self::DateHeader { .. } => {
                let header = response.date.as_deref().ok_or_else(|| {
                    ExchangeError::ClockSync("response has no Date header".to_string())
                })?;
                DateTime::parse_from_rfc2822(header)
                    .map(|dt| dt.timestamp_millis())
                    .map_err(|e| {
                        ExchangeError::ClockSync(format!("invalid Date header '{}': {}", header, e))
                    })
            }
        }
    }
}

/// Local wall clock in milliseconds
pub fn local_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Tracks the offset between the local clock and the exchange clock.
///
/// `now()` is a lock-free atomic read. Refreshes are serialized so concurrent
/// callers never race two probes against each other, and a failed probe leaves
/// the previous offset in place.
#[derive(Debug)]
pub struct ClockSync {
    source: ClockSource,
    refresh_interval: Option<Duration>,
    offset_millis: AtomicI64,
    last_synced_at: AtomicI64,
    last_attempt_at: AtomicI64,
    probe_lock: Mutex<()>,
}

impl ClockSync {
    pub fn new(source: ClockSource) -> Self {
        Self {
            source,
            refresh_interval: None,
            offset_millis: AtomicI64::new(0),
            last_synced_at: AtomicI64::new(0),
            last_attempt_at: AtomicI64::new(0),
            probe_lock: Mutex::new(()),
        }
    }

    /// Refresh before signed calls once `interval` has passed since the last probe
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn source(&self) -> &ClockSource {
        &self.source
    }

    /// Estimated exchange time in milliseconds
    pub fn now(&self) -> i64 {
        local_millis() + self.offset_millis()
    }

    pub fn offset_millis(&self) -> i64 {
        self.offset_millis.load(Ordering::Acquire)
    }

    /// Local time of the last successful sync, 0 if never synced
    pub fn last_synced_at(&self) -> i64 {
        self.last_synced_at.load(Ordering::Acquire)
    }

    pub fn is_synced(&self) -> bool {
        self.last_synced_at() != 0
    }

    /// Whether the periodic policy calls for a refresh
    pub fn needs_refresh(&self) -> bool {
        let Some(interval) = self.refresh_interval else {
            return false;
        };
        let last = self.last_attempt_at.load(Ordering::Acquire);
        last == 0 || local_millis() - last >= interval.as_millis() as i64
    }

    /// Record a server time observed at `local_at_request`
    pub fn apply_server_time(&self, server_millis: i64, local_at_request: i64) -> i64 {
        let offset = server_millis - local_at_request;
        self.offset_millis.store(offset, Ordering::Release);
        self.last_synced_at.store(local_millis(), Ordering::Release);
        offset
    }

    /// Probe the exchange clock and update the offset.
    ///
    /// Returns the new offset, or a `ClockSync` error with the offset untouched.
    pub async fn try_refresh(&self, transport: &dyn Transport) -> Result<i64, ExchangeError> {
        let _guard = self.probe_lock.lock().await;
        self.probe(transport).await
    }

    /// Best-effort refresh. Failures are logged and the stale offset is kept.
    pub async fn refresh(&self, transport: &dyn Transport) -> bool {
        let result = self.try_refresh(transport).await;
        self.log_failure(result)
    }

    /// Periodic refresh. The interval is checked again once the probe lock is
    /// held, so callers queued behind another probe do not repeat it.
    ///
    /// Returns true only when this call probed successfully.
    pub async fn refresh_if_due(&self, transport: &dyn Transport) -> bool {
        if !self.needs_refresh() {
            return false;
        }
        let _guard = self.probe_lock.lock().await;
        if !self.needs_refresh() {
            return false;
        }
        let result = self.probe(transport).await;
        self.log_failure(result)
    }

    /// Caller must hold `probe_lock`
    async fn probe(&self, transport: &dyn Transport) -> Result<i64, ExchangeError> {
        let probe = WireRequest {
            method: Method::GET,
            path: self.source.path().to_string(),
            query: None,
            headers: Vec::new(),
            body: None,
        };

        let local_at_request = local_millis();
        self.last_attempt_at
            .store(local_at_request, Ordering::Release);

        let sent = transport.send(&probe).await;
        self.last_attempt_at.store(local_millis(), Ordering::Release);

        let response =
            sent.map_err(|e| ExchangeError::ClockSync(format!("time probe failed: {}", e)))?;
        let server_millis = self.source.read_server_millis(&response)?;

        let offset = self.apply_server_time(server_millis, local_at_request);
        debug!(
            server = server_millis,
            local = local_at_request,
            offset_ms = offset,
            "clock synchronized"
        );
        Ok(offset)
    }

    fn log_failure(&self, result: Result<i64, ExchangeError>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, offset_ms = self.offset_millis(), "clock sync failed, keeping previous offset");
                false
            }
        }
    }
}
