use crate::core::errors::ExchangeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackpackMarket {
    pub symbol: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    #[serde(default)]
    pub market_type: Option<String>,
    #[serde(default)]
    pub order_book_state: Option<String>,
}

/// One order in an `orderExecute` batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackpackOrderRequest {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
}

impl BackpackOrderRequest {
    pub fn new(symbol: impl Into<String>, side: impl Into<String>, order_type: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            side: side.into(),
            order_type: order_type.into(),
            ..Self::default()
        }
    }
}

/// Cancel request; the exchange needs the symbol and one of the two ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackpackCancelOrder {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u32>,
}

/// Serialize a request struct into the JSON object form used by the signer
pub(crate) fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, ExchangeError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ExchangeError::InvalidParameters(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
