use crate::core::errors::ExchangeError;
use crate::core::kernel::{Orchestrator, Params, RequestDescriptor};
use crate::exchanges::aster_futures::types::{AsterFuturesBalance, AsterFuturesOrder};
use serde_json::Value;

/// Thin typed wrapper around the orchestrator for the Aster futures API
#[derive(Debug, Clone)]
pub struct AsterFuturesRestClient {
    orchestrator: Orchestrator,
}

impl AsterFuturesRestClient {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn server_time(&self) -> Result<Value, ExchangeError> {
        self.orchestrator
            .execute_json(&RequestDescriptor::get("/fapi/v1/time"))
            .await
    }

    /// Get futures balances (requires authentication)
    pub async fn balance(
        &self,
        recv_window: Option<u64>,
    ) -> Result<Vec<AsterFuturesBalance>, ExchangeError> {
        let request = RequestDescriptor::get("/fapi/v2/balance")
            .params(Params::new().with_opt("recvWindow", recv_window))
            .signed();
        self.orchestrator.execute_json(&request).await
    }

    pub async fn account(&self) -> Result<Value, ExchangeError> {
        self.orchestrator
            .execute_json(&RequestDescriptor::get("/fapi/v2/account").signed())
            .await
    }

    /// Place a new order; parameters are sent as a form body
    pub async fn new_order(&self, order: &AsterFuturesOrder) -> Result<Value, ExchangeError> {
        let request = RequestDescriptor::post("/fapi/v1/order")
            .params(order.to_params())
            .signed();
        self.orchestrator.execute_json(&request).await
    }

    pub async fn query_order(
        &self,
        symbol: &str,
        order_id: Option<i64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<Value, ExchangeError> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("orderId", order_id)
            .with_opt("origClientOrderId", orig_client_order_id);
        let request = RequestDescriptor::get("/fapi/v1/order").params(params).signed();
        self.orchestrator.execute_json(&request).await
    }

    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: Option<i64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<Value, ExchangeError> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("orderId", order_id)
            .with_opt("origClientOrderId", orig_client_order_id);
        let request = RequestDescriptor::delete("/fapi/v1/order")
            .params(params)
            .signed();
        self.orchestrator.execute_json(&request).await
    }

    pub async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<Value, ExchangeError> {
        let params = Params::new()
            .with("symbol", symbol)
            .with("leverage", leverage);
        let request = RequestDescriptor::post("/fapi/v1/leverage")
            .params(params)
            .signed();
        self.orchestrator.execute_json(&request).await
    }
}
