use crate::core::errors::ExchangeError;
use crate::core::kernel::{Orchestrator, Params, RequestDescriptor};
use crate::exchanges::aster::types::{AsterNewOrder, AsterServerTime};
use serde_json::Value;

/// Thin typed wrapper around the orchestrator for the Aster spot API
#[derive(Debug, Clone)]
pub struct AsterRestClient {
    orchestrator: Orchestrator,
}

impl AsterRestClient {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn server_time(&self) -> Result<AsterServerTime, ExchangeError> {
        self.orchestrator
            .execute_json(&RequestDescriptor::get("/api/v1/time"))
            .await
    }

    /// Get account information (requires authentication)
    pub async fn account(&self) -> Result<Value, ExchangeError> {
        self.orchestrator
            .execute_json(&RequestDescriptor::get("/api/v1/account").signed())
            .await
    }

    /// Place a new order (requires authentication)
    pub async fn new_order(&self, order: &AsterNewOrder) -> Result<Value, ExchangeError> {
        let request = RequestDescriptor::post("/api/v1/order")
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
        let request = RequestDescriptor::get("/api/v1/order").params(params).signed();
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
        let request = RequestDescriptor::delete("/api/v1/order")
            .params(params)
            .signed();
        self.orchestrator.execute_json(&request).await
    }
}
