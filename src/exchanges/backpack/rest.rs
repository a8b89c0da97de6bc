use crate::core::errors::ExchangeError;
use crate::core::kernel::{Orchestrator, Params, RequestDescriptor};
use crate::exchanges::backpack::types::{
    to_object, BackpackCancelOrder, BackpackMarket, BackpackOrderRequest,
};
use serde_json::Value;

/// Thin typed wrapper around the orchestrator for the Backpack API
#[derive(Debug, Clone)]
pub struct BackpackRestClient {
    orchestrator: Orchestrator,
}

impl BackpackRestClient {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Get all markets
    pub async fn get_markets(&self) -> Result<Vec<BackpackMarket>, ExchangeError> {
        self.orchestrator
            .execute_json(&RequestDescriptor::get("/api/v1/markets"))
            .await
    }

    pub async fn get_balances(&self) -> Result<Value, ExchangeError> {
        let request = RequestDescriptor::get("/api/v1/capital")
            .instruction("balanceQuery")
            .signed();
        self.orchestrator.execute_json(&request).await
    }

    /// Query one order by exchange id or client id
    pub async fn get_order(
        &self,
        symbol: &str,
        order_id: Option<&str>,
        client_id: Option<u32>,
    ) -> Result<Value, ExchangeError> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("orderId", order_id)
            .with_opt("clientId", client_id);
        let request = RequestDescriptor::get("/api/v1/order")
            .params(params)
            .instruction("orderQuery")
            .signed();
        self.orchestrator.execute_json(&request).await
    }

    /// Submit orders as one `orderExecute` batch
    pub async fn execute_orders(
        &self,
        orders: &[BackpackOrderRequest],
    ) -> Result<Value, ExchangeError> {
        let items = orders.iter().map(to_object).collect::<Result<Vec<_>, _>>()?;
        let request = RequestDescriptor::post("/api/v1/orders")
            .batch(items)
            .instruction("orderExecute")
            .signed();
        self.orchestrator.execute_json(&request).await
    }

    pub async fn execute_order(&self, order: &BackpackOrderRequest) -> Result<Value, ExchangeError> {
        self.execute_orders(std::slice::from_ref(order)).await
    }

    pub async fn cancel_order(&self, cancel: &BackpackCancelOrder) -> Result<Value, ExchangeError> {
        let request = RequestDescriptor::delete("/api/v1/order")
            .json_body(Value::Object(to_object(cancel)?))
            .instruction("orderCancel")
            .signed();
        self.orchestrator.execute_json(&request).await
    }
}
