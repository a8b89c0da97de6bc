use crate::core::kernel::params::Params;
use crate::core::kernel::signer::SignatureResult;
use reqwest::Method;
use serde_json::{Map, Value};

/// Where request parameters travel on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPlacement {
    Query,
    /// `application/x-www-form-urlencoded` body
    FormBody,
    /// `application/json` body
    JsonBody,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// List of sub-requests signed together (batched order placement)
    Batch(Vec<Map<String, Value>>),
}

/// One logical call, as described by an endpoint wrapper.
///
/// The descriptor never holds a timestamp or signature; each attempt derives a
/// fresh [`PreparedRequest`] from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    params: Params,
    body: RequestBody,
    signed: bool,
    instruction: Option<String>,
    window: Option<u64>,
    placement: Option<ParamPlacement>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            body: RequestBody::Empty,
            signed: false,
            instruction: None,
            window: None,
            placement: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn batch(mut self, items: Vec<Map<String, Value>>) -> Self {
        self.body = RequestBody::Batch(items);
        self
    }

    #[must_use]
    pub const fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    #[must_use]
    pub fn instruction(mut self, tag: impl Into<String>) -> Self {
        self.instruction = Some(tag.into());
        self
    }

    #[must_use]
    pub const fn window(mut self, window_ms: u64) -> Self {
        self.window = Some(window_ms);
        self
    }

    /// Override the exchange's default parameter placement for this call
    #[must_use]
    pub const fn placement(mut self, placement: ParamPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parameters(&self) -> &Params {
        &self.params
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn instruction_tag(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    pub fn window_override(&self) -> Option<u64> {
        self.window
    }

    pub fn placement_override(&self) -> Option<ParamPlacement> {
        self.placement
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireBody {
    Form(String),
    Json(String),
}

impl WireBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Form(_) => "application/x-www-form-urlencoded",
            Self::Json(_) => "application/json",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Form(s) | Self::Json(s) => s,
        }
    }
}

/// Exact bytes handed to the transport for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<WireBody>,
}

impl WireRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path plus query string, as it appears in the request line
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) if !query.is_empty() => format!("{}?{}", self.path, query),
            _ => self.path.clone(),
        }
    }
}

/// A descriptor resolved for one attempt: wire form plus signing metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub wire: WireRequest,
    pub timestamp: Option<i64>,
    pub window: Option<u64>,
    pub signature: Option<SignatureResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let descriptor = RequestDescriptor::get("/api/v1/order")
            .params(Params::new().with("symbol", "SOL_USDC"))
            .instruction("orderQuery")
            .window(30_000)
            .signed();

        assert_eq!(descriptor.method(), &Method::GET);
        assert!(descriptor.is_signed());
        assert_eq!(descriptor.instruction_tag(), Some("orderQuery"));
        assert_eq!(descriptor.window_override(), Some(30_000));
        assert_eq!(descriptor.body(), &RequestBody::Empty);
    }

    #[test]
    fn test_path_and_query() {
        let wire = WireRequest {
            method: Method::GET,
            path: "/api/v1/time".to_string(),
            query: Some("a=1".to_string()),
            headers: vec![("X-MBX-APIKEY".to_string(), "k".to_string())],
            body: None,
        };
        assert_eq!(wire.path_and_query(), "/api/v1/time?a=1");
        assert_eq!(wire.header("x-mbx-apikey"), Some("k"));
    }
}
