use crate::core::kernel::Params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsterFuturesBalance {
    pub asset: String,
    pub balance: String,
    #[serde(default)]
    pub available_balance: Option<String>,
    #[serde(default)]
    pub cross_un_pnl: Option<String>,
    #[serde(default)]
    pub update_time: Option<i64>,
}

/// Futures order request. The wire order of these fields is irrelevant:
/// the fixed-order scheme reorders them before signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsterFuturesOrder {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub position_side: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub time_in_force: Option<String>,
    pub reduce_only: Option<bool>,
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<String>,
    pub close_position: Option<bool>,
    pub working_type: Option<String>,
    pub new_order_resp_type: Option<String>,
    pub recv_window: Option<u64>,
}

impl AsterFuturesOrder {
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
            .with_opt("positionSide", self.position_side.as_ref())
            .with_opt("quantity", self.quantity.as_ref())
            .with_opt("price", self.price.as_ref())
            .with_opt("timeInForce", self.time_in_force.as_ref())
            .with_opt("reduceOnly", self.reduce_only)
            .with_opt("newClientOrderId", self.new_client_order_id.as_ref())
            .with_opt("stopPrice", self.stop_price.as_ref())
            .with_opt("closePosition", self.close_position)
            .with_opt("workingType", self.working_type.as_ref())
            .with_opt("newOrderRespType", self.new_order_resp_type.as_ref())
            .with_opt("recvWindow", self.recv_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans_render_lowercase() {
        let order = AsterFuturesOrder {
            reduce_only: Some(true),
            ..AsterFuturesOrder::new("BTCUSDT", "SELL", "MARKET")
        };
        assert_eq!(order.to_params().get("reduceOnly"), Some("true"));
    }

    #[test]
    fn test_balance_tolerates_missing_fields() {
        let balance: AsterFuturesBalance =
            serde_json::from_str(r#"{"asset":"USDT","balance":"12.5"}"#).unwrap();
        assert_eq!(balance.asset, "USDT");
        assert!(balance.available_balance.is_none());
    }
}
