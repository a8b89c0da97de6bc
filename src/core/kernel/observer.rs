use crate::core::kernel::recovery::ErrorClass;
use crate::core::kernel::request::PreparedRequest;
use tracing::{debug, info, warn};

const REDACTED: &str = "<redacted>";

/// Header names whose values never reach an observer
const SENSITIVE_HEADERS: &[&str] = &["x-signature", "x-mbx-apikey", "x-api-key"];

/// Redacted view of one dispatched attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEvent {
    pub exchange: String,
    pub attempt: u32,
    pub method: String,
    pub path: String,
    /// Query string with the `signature` value masked
    pub query: Option<String>,
    /// Body with the `signature` value masked
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Canonical string that was signed; only populated in debug mode
    pub canonical: Option<String>,
    pub timestamp: Option<i64>,
    pub window: Option<u64>,
}

impl DispatchEvent {
    pub fn from_prepared(
        exchange: &str,
        attempt: u32,
        prepared: &PreparedRequest,
        include_canonical: bool,
    ) -> Self {
        let wire = &prepared.wire;
        Self {
            exchange: exchange.to_string(),
            attempt,
            method: wire.method.to_string(),
            path: wire.path.clone(),
            query: wire.query.as_deref().map(mask_signature),
            body: wire.body.as_ref().map(|b| mask_signature(b.as_str())),
            headers: wire
                .headers
                .iter()
                .map(|(k, v)| {
                    if SENSITIVE_HEADERS.contains(&k.to_ascii_lowercase().as_str()) {
                        (k.clone(), REDACTED.to_string())
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect(),
            canonical: if include_canonical {
                prepared.signature.as_ref().map(|s| s.canonical.clone())
            } else {
                None
            },
            timestamp: prepared.timestamp,
            window: prepared.window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEvent {
    pub exchange: String,
    pub path: String,
    /// Attempt that was rejected
    pub attempt: u32,
    pub max_attempts: u32,
    pub class: ErrorClass,
    pub status: u16,
    /// Whether the clock probe before the next attempt succeeded
    pub resynced: bool,
    pub offset_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEvent {
    pub exchange: String,
    pub path: String,
    pub attempts: u32,
    pub status: Option<u16>,
    pub success: bool,
}

/// Observability hook invoked by the orchestrator.
///
/// Events never contain secrets, API keys or signature tokens.
pub trait RequestObserver: Send + Sync {
    fn on_dispatch(&self, _event: &DispatchEvent) {}
    fn on_retry(&self, _event: &RetryEvent) {}
    fn on_outcome(&self, _event: &OutcomeEvent) {}
}

/// Default observer emitting `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_dispatch(&self, event: &DispatchEvent) {
        debug!(
            exchange = %event.exchange,
            attempt = event.attempt,
            method = %event.method,
            path = %event.path,
            query = ?event.query,
            body = ?event.body,
            headers = ?event.headers,
            canonical = ?event.canonical,
            timestamp = ?event.timestamp,
            window = ?event.window,
            "dispatching request"
        );
    }

    fn on_retry(&self, event: &RetryEvent) {
        match event.class {
            ErrorClass::InvalidTimestamp => warn!(
                exchange = %event.exchange,
                path = %event.path,
                attempt = event.attempt,
                max_attempts = event.max_attempts,
                status = event.status,
                resynced = event.resynced,
                offset_ms = event.offset_ms,
                "timestamp rejected, retrying with a fresh timestamp"
            ),
            ErrorClass::InvalidSignature => warn!(
                exchange = %event.exchange,
                path = %event.path,
                attempt = event.attempt,
                max_attempts = event.max_attempts,
                status = event.status,
                resynced = event.resynced,
                offset_ms = event.offset_ms,
                "signature rejected, retrying after clock resync"
            ),
        }
    }

    fn on_outcome(&self, event: &OutcomeEvent) {
        if event.success {
            debug!(exchange = %event.exchange, path = %event.path, attempts = event.attempts, "request succeeded");
        } else {
            info!(exchange = %event.exchange, path = %event.path, attempts = event.attempts, status = ?event.status, "request failed");
        }
    }
}

/// Replace the value of any `signature=` pair
fn mask_signature(encoded: &str) -> String {
    encoded
        .split('&')
        .map(|piece| match piece.split_once('=') {
            Some(("signature", _)) => format!("signature={}", REDACTED),
            _ => piece.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}
