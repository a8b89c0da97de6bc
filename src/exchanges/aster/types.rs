use crate::core::kernel::Params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsterServerTime {
    pub server_time: i64,
}

/// Spot order request; optional fields are left out of the signed query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsterNewOrder {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub time_in_force: Option<String>,
    pub quantity: Option<String>,
    pub quote_order_qty: Option<String>,
    pub price: Option<String>,
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<String>,
    pub recv_window: Option<u64>,
}

impl AsterNewOrder {
    pub fn new(symbol: impl Into<String>, side: impl Into<String>, order_type: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            side: side.into(),
            order_type: order_type.into(),
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> Params {
        Params::new()
            .with("symbol", &self.symbol)
            .with("side", &self.side)
            .with("type", &self.order_type)
            .with_opt("timeInForce", self.time_in_force.as_ref())
            .with_opt("quantity", self.quantity.as_ref())
            .with_opt("quoteOrderQty", self.quote_order_qty.as_ref())
            .with_opt("price", self.price.as_ref())
            .with_opt("newClientOrderId", self.new_client_order_id.as_ref())
            .with_opt("stopPrice", self.stop_price.as_ref())
            .with_opt("recvWindow", self.recv_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_params_keep_field_order() {
        let order = AsterNewOrder {
            quantity: Some("0.01".to_string()),
            price: Some("65000".to_string()),
            time_in_force: Some("GTC".to_string()),
            ..AsterNewOrder::new("BTCUSDT", "BUY", "LIMIT")
        };
        let params = order.to_params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["symbol", "side", "type", "timeInForce", "quantity", "price"]);
    }
}
