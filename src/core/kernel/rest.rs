use crate::core::errors::ExchangeError;
use crate::core::kernel::request::WireRequest;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, DATE};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{instrument, trace};

/// Raw HTTP response as seen by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Value of the `Date` header, used by header-based clock probes
    pub date: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
    }
}

/// Transport trait for sending prepared requests
///
/// Implementations send the wire request byte-for-byte: no re-encoding or
/// reordering of the query string or body. Every call must be bounded by a
/// timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &WireRequest) -> Result<RawResponse, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    /// Create a new configuration
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the API; a trailing slash is dropped
    /// * `exchange_name` - Name of the exchange
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            exchange_name,
            timeout_seconds: 30,
            user_agent: "dexwire/0.1".to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST transport instances
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    /// Build the REST transport
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `Transport` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn new(base_url: String, exchange_name: String) -> Result<Self, ExchangeError> {
        RestClientBuilder::new(RestClientConfig::new(base_url, exchange_name)).build()
    }

    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Build the full URL for a wire request
    fn build_url(&self, request: &WireRequest) -> String {
        format!("{}{}", self.config.base_url, request.path_and_query())
    }

    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn read_response(&self, response: Response) -> Result<RawResponse, ExchangeError> {
        let status = response.status().as_u16();
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let date = headers
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to read response body: {}", e))
        })?;

        trace!("Response body: {}", body);

        Ok(RawResponse {
            status,
            content_type,
            date,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestRest {
    #[instrument(skip(self, request), fields(exchange = %self.config.exchange_name, method = %request.method, path = %request.path))]
    async fn send(&self, request: &WireRequest) -> Result<RawResponse, ExchangeError> {
        let url = self.build_url(request);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(ACCEPT, "application/json");

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type())
                .body(body.as_str().to_string());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ExchangeError::Timeout(format!(
                    "{} {} exceeded {}s",
                    request.method, request.path, self.config.timeout_seconds
                ))
            } else {
                ExchangeError::NetworkError(format!("Request failed: {}", e))
            }
        })?;

        self.read_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::request::WireBody;
    use reqwest::Method;

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = RestClientConfig::new(
            "https://sapi.asterdex.com/".to_string(),
            "aster".to_string(),
        )
        .with_timeout(15);
        assert_eq!(config.base_url, "https://sapi.asterdex.com");
        assert_eq!(config.timeout_seconds, 15);
    }

    #[test]
    fn test_url_keeps_query_verbatim() {
        let rest = ReqwestRest::new("https://example.test".to_string(), "test".to_string()).unwrap();
        let request = WireRequest {
            method: Method::GET,
            path: "/api/v1/order".to_string(),
            query: Some("symbol=BTCUSDT&timestamp=1&signature=ab".to_string()),
            headers: Vec::new(),
            body: None,
        };
        assert_eq!(
            rest.build_url(&request),
            "https://example.test/api/v1/order?symbol=BTCUSDT&timestamp=1&signature=ab"
        );
    }

    #[test]
    fn test_raw_response_json_detection() {
        let response = RawResponse {
            status: 200,
            content_type: Some("application/json;charset=UTF-8".to_string()),
            date: None,
            body: "{}".to_string(),
        };
        assert!(response.is_success());
        assert!(response.is_json());
        assert_eq!(WireBody::Json(String::new()).content_type(), "application/json");
    }

    #[tokio::test]
    async fn test_send_against_local_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/fapi/v1/order")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("symbol=BTCUSDT&timestamp=1&signature=ff")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"orderId":1}"#)
            .create_async()
            .await;

        let rest = ReqwestRest::new(server.url(), "test".to_string()).unwrap();
        let request = WireRequest {
            method: Method::POST,
            path: "/fapi/v1/order".to_string(),
            query: None,
            headers: vec![("X-MBX-APIKEY".to_string(), "key".to_string())],
            body: Some(WireBody::Form(
                "symbol=BTCUSDT&timestamp=1&signature=ff".to_string(),
            )),
        };
        let response = rest.send(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"orderId":1}"#);
        assert!(response.is_json());
    }
}
