use crate::core::errors::{ErrorPayload, ExchangeError};
use crate::core::kernel::canonical::TIMESTAMP_KEY;
use crate::core::kernel::clock::ClockSync;
use crate::core::kernel::observer::{
    DispatchEvent, OutcomeEvent, RequestObserver, RetryEvent, TracingObserver,
};
use crate::core::kernel::params::Params;
use crate::core::kernel::profile::ExchangeProfile;
use crate::core::kernel::recovery::{ErrorClass, RecoveryAction};
use crate::core::kernel::request::{ParamPlacement, PreparedRequest, RequestDescriptor};
use crate::core::kernel::rest::{RawResponse, RestClientBuilder, RestClientConfig, Transport};
use crate::core::kernel::scheme::{prepare_unsigned, SigningContext};
use crate::core::kernel::signer::Signer;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::instrument;

/// Successful response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Deserialize the body, parsing text bodies as JSON
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ExchangeError> {
        let decoded = match self {
            Self::Json(value) => serde_json::from_value(value),
            Self::Text(text) => serde_json::from_str(&text),
        };
        decoded.map_err(|e| {
            ExchangeError::DeserializationError(format!("Failed to deserialize JSON: {}", e))
        })
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// Turn a raw response into a success value or a terminal API error
pub fn evaluate_response(response: RawResponse) -> Result<ApiResponse, ExchangeError> {
    if !response.is_success() {
        return Err(ExchangeError::ApiError {
            status: response.status,
            payload: ErrorPayload::from_body(&response.body),
        });
    }

    if response.is_json() && !response.body.trim().is_empty() {
        serde_json::from_str(&response.body)
            .map(ApiResponse::Json)
            .map_err(|e| {
                ExchangeError::DeserializationError(format!("Failed to parse JSON response: {}", e))
            })
    } else {
        Ok(ApiResponse::Text(response.body))
    }
}

/// Executes logical calls for one exchange: signing, dispatch, and the
/// bounded resync-and-retry ladder.
///
/// Cloning is cheap and clones share the same clock, so one orchestrator can
/// serve concurrent tasks.
#[derive(Clone)]
pub struct Orchestrator {
    profile: Arc<ExchangeProfile>,
    transport: Arc<dyn Transport>,
    signer: Option<Arc<dyn Signer>>,
    clock: Arc<ClockSync>,
    observer: Arc<dyn RequestObserver>,
    debug: bool,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("exchange", &self.profile.name)
            .field("has_signer", &self.signer.is_some())
            .field("offset_ms", &self.clock.offset_millis())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn profile(&self) -> &ExchangeProfile {
        &self.profile
    }

    pub fn clock(&self) -> &ClockSync {
        &self.clock
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Best-effort clock sync, used once at client construction
    pub async fn warm_up(&self) -> bool {
        self.clock.refresh(self.transport.as_ref()).await
    }

    fn placement_for(&self, request: &RequestDescriptor) -> ParamPlacement {
        request
            .placement_override()
            .unwrap_or_else(|| self.profile.placement.for_method(request.method()))
    }

    /// Resolve `request` into its wire form for a 1-based `attempt`.
    ///
    /// Signed requests get a fresh timestamp from the clock on every call; a
    /// caller-supplied `timestamp` parameter is honored on the first attempt
    /// only.
    ///
    /// Timestamps are not clamped. A resync that lowers the offset (local
    /// clock ahead of the exchange) can give a retry an earlier timestamp than
    /// the attempt it replaces; the server's clock wins over monotonicity.
    pub fn prepare(
        &self,
        request: &RequestDescriptor,
        attempt: u32,
    ) -> Result<PreparedRequest, ExchangeError> {
        let placement = self.placement_for(request);
        if !request.is_signed() {
            return prepare_unsigned(request, placement);
        }

        let signer = self.require_signer(request)?;
        let timestamp = self.clock.now();
        let window = request
            .window_override()
            .or(self.profile.default_window)
            .map(|base| self.profile.retry.window_for_attempt(attempt, base));

        let params: Cow<'_, Params> =
            if attempt > 1 && request.parameters().contains(TIMESTAMP_KEY) {
                let mut refreshed = request.parameters().clone();
                refreshed.insert(TIMESTAMP_KEY, timestamp);
                Cow::Owned(refreshed)
            } else {
                Cow::Borrowed(request.parameters())
            };

        let ctx = SigningContext {
            signer,
            api_key_header: &self.profile.api_key_header,
            placement,
            timestamp,
            window,
        };
        self.profile
            .scheme
            .prepare_signed(request, params.as_ref(), &ctx)
    }

    fn require_signer(&self, request: &RequestDescriptor) -> Result<&dyn Signer, ExchangeError> {
        self.signer.as_deref().ok_or_else(|| {
            ExchangeError::MissingCredentials(format!(
                "{} {} on {} is signed but no credentials are configured",
                request.method(),
                request.path(),
                self.profile.name
            ))
        })
    }

    /// Classify a terminal error against the recovery table
    fn recoverable(&self, error: &ExchangeError) -> Option<ErrorClass> {
        let ExchangeError::ApiError { payload, .. } = error else {
            return None;
        };
        self.profile
            .recovery
            .classify(payload)
            .map(|rule| match rule.action {
                RecoveryAction::ResyncAndRetry => rule.class,
            })
    }

    async fn dispatch(
        &self,
        prepared: &PreparedRequest,
        attempt: u32,
    ) -> Result<ApiResponse, ExchangeError> {
        self.observer.on_dispatch(&DispatchEvent::from_prepared(
            &self.profile.name,
            attempt,
            prepared,
            self.debug,
        ));
        let response = self.transport.send(&prepared.wire).await?;
        evaluate_response(response)
    }

    fn report(&self, request: &RequestDescriptor, attempts: u32, outcome: &Result<ApiResponse, ExchangeError>) {
        self.observer.on_outcome(&OutcomeEvent {
            exchange: self.profile.name.clone(),
            path: request.path().to_string(),
            attempts,
            status: outcome.as_ref().err().and_then(ExchangeError::status),
            success: outcome.is_ok(),
        });
    }

    /// Execute one logical call.
    ///
    /// Signed calls rejected with a recoverable code are retried with a fresh
    /// timestamp after a clock refresh, up to the profile's attempt bound.
    /// Exhausting the bound yields `RetryExhausted` wrapping the last error.
    #[instrument(skip(self, request), fields(exchange = %self.profile.name, method = %request.method(), path = %request.path()))]
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse, ExchangeError> {
        if !request.is_signed() {
            let prepared = self.prepare(request, 1)?;
            let outcome = self.dispatch(&prepared, 1).await;
            self.report(request, 1, &outcome);
            return outcome;
        }

        // Credentials are checked before any I/O, including the clock probe.
        self.require_signer(request)?;

        self.clock.refresh_if_due(self.transport.as_ref()).await;

        let max_attempts = self.profile.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let prepared = self.prepare(request, attempt)?;
            let outcome = self.dispatch(&prepared, attempt).await;

            let error = match outcome {
                Ok(value) => {
                    let outcome = Ok(value);
                    self.report(request, attempt, &outcome);
                    return outcome;
                }
                Err(error) => error,
            };

            let Some(class) = self.recoverable(&error) else {
                let outcome = Err(error);
                self.report(request, attempt, &outcome);
                return outcome;
            };

            if attempt >= max_attempts {
                let outcome = Err(ExchangeError::RetryExhausted {
                    attempts: attempt,
                    class,
                    last: Box::new(error),
                });
                self.report(request, attempt, &outcome);
                return outcome;
            }

            let resynced = self.clock.refresh(self.transport.as_ref()).await;
            self.observer.on_retry(&RetryEvent {
                exchange: self.profile.name.clone(),
                path: request.path().to_string(),
                attempt,
                max_attempts,
                class,
                status: error.status().unwrap_or_default(),
                resynced,
                offset_ms: self.clock.offset_millis(),
            });
            attempt += 1;
        }
    }

    /// Execute and deserialize the response body
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<T, ExchangeError> {
        self.execute(request).await?.json()
    }
}

/// Builder for [`Orchestrator`]
pub struct OrchestratorBuilder {
    profile: ExchangeProfile,
    transport: Option<Arc<dyn Transport>>,
    signer: Option<Arc<dyn Signer>>,
    observer: Option<Arc<dyn RequestObserver>>,
    debug: bool,
}

impl OrchestratorBuilder {
    pub fn new(profile: ExchangeProfile) -> Self {
        Self {
            profile,
            transport: None,
            signer: None,
            observer: None,
            debug: false,
        }
    }

    /// Use a custom transport instead of the reqwest client built from the profile
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Include canonical strings in dispatch events
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn build(self) -> Result<Orchestrator, ExchangeError> {
        if let Some(signer) = &self.signer {
            if signer.kind() != self.profile.scheme.signer_kind() {
                return Err(ExchangeError::AuthError(format!(
                    "{} requires a {:?} signer, got {:?}",
                    self.profile.name,
                    self.profile.scheme.signer_kind(),
                    signer.kind()
                )));
            }
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let rest_config = RestClientConfig::new(
                    self.profile.base_url.clone(),
                    self.profile.name.clone(),
                )
                .with_timeout(self.profile.timeout_seconds);
                Arc::new(RestClientBuilder::new(rest_config).build()?) as Arc<dyn Transport>
            }
        };

        let mut clock = ClockSync::new(self.profile.clock_source.clone());
        if let Some(interval) = self.profile.clock_refresh_interval {
            clock = clock.with_refresh_interval(interval);
        }

        Ok(Orchestrator {
            profile: Arc::new(self.profile),
            transport,
            signer: self.signer,
            clock: Arc::new(clock),
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(TracingObserver) as Arc<dyn RequestObserver>),
            debug: self.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, content_type: Option<&str>, body: &str) -> RawResponse {
        RawResponse {
            status,
            content_type: content_type.map(str::to_string),
            date: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_json_success_is_decoded() {
        let value = evaluate_response(raw(200, Some("application/json"), r#"{"a":1}"#)).unwrap();
        assert_eq!(value, ApiResponse::Json(serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_non_json_success_is_text() {
        let value = evaluate_response(raw(200, Some("text/plain"), "pong")).unwrap();
        assert_eq!(value, ApiResponse::Text("pong".to_string()));
    }

    #[test]
    fn test_error_keeps_text_payload() {
        let err = evaluate_response(raw(502, Some("text/html"), "bad gateway")).unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            err.payload(),
            Some(&ErrorPayload::Text("bad gateway".to_string()))
        );
    }

    #[test]
    fn test_text_body_parsed_as_json_on_request() {
        let parsed: Value = ApiResponse::Text(r#"{"serverTime":5}"#.to_string())
            .json()
            .unwrap();
        assert_eq!(parsed["serverTime"], 5);
    }
}
