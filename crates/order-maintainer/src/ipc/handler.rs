//! Request Handler
//!
//! Boundary between loosely-typed callers and the maintainer:
//! 1. Run the validation gate (no store access on failure)
//! 2. Dispatch to the service
//! 3. Flatten the result into an `OrderResponse`
//!
//! No error escapes as anything other than `failed: true`.

use serde_json::Value;
use tracing::{debug, warn};

use crate::application::service::OrderMaintainer;
use crate::domain::errors::OrderError;
use crate::domain::validation::{validate_order, validate_partition, validate_rank, validate_record_id};
use crate::domain::value_objects::IdFormat;
use crate::ipc::payloads::{OrderRequest, OrderResponse};
use crate::ports::inbound::OrderMaintenanceApi;
use crate::ports::outbound::OrderedCollectionStore;

/// Handler for order-maintenance requests.
pub struct RequestHandler<S> {
    service: OrderMaintainer<S>,
}

impl<S: OrderedCollectionStore> RequestHandler<S> {
    pub fn new(service: OrderMaintainer<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &OrderMaintainer<S> {
        &self.service
    }

    fn id_format(&self) -> IdFormat {
        self.service.config().id_format
    }

    /// Handle a raw JSON request. Malformed requests become failures.
    pub async fn handle_value(&self, raw: Value) -> OrderResponse {
        match serde_json::from_value::<OrderRequest>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected malformed request");
                OrderResponse::failure(format!("invalid request: {e}"))
            }
        }
    }

    /// Handle a typed request.
    pub async fn handle(&self, request: OrderRequest) -> OrderResponse {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_validation() {
                    debug!(error = %err, "Request failed validation");
                } else {
                    warn!(error = %err, "Order maintenance failed");
                }
                OrderResponse::failure(err.to_string())
            }
        }
    }

    async fn dispatch(&self, request: OrderRequest) -> Result<OrderResponse, OrderError> {
        match request {
            OrderRequest::MaxOrder {
                query_obj,
                order_field,
            } => {
                let partition = validate_partition(query_obj.as_ref(), order_field.as_ref())?;
                let max = self.service.max_order(&partition).await?;
                Ok(OrderResponse::success("Max order computed").with_max_order(max))
            }
            OrderRequest::NextOrder {
                query_obj,
                order_field,
            } => {
                let partition = validate_partition(query_obj.as_ref(), order_field.as_ref())?;
                let next = self.service.next_order(&partition).await?;
                Ok(OrderResponse::success("Next order computed").with_max_order(next))
            }
            OrderRequest::UpdateOrder {
                id,
                current_order,
                past_order,
                query_obj,
                order_field,
            } => {
                let id = validate_record_id(id.as_ref(), self.id_format())?;
                let new = validate_rank("current_order", current_order.as_ref())?;
                let past = validate_order("past_order", past_order.as_ref())?;
                let partition = validate_partition(query_obj.as_ref(), order_field.as_ref())?;

                let outcome = self.service.move_item(&id, new, past, &partition).await?;
                Ok(OrderResponse::success(outcome.message()).with_shifted(outcome.shifted()))
            }
            OrderRequest::RemoveExceptDeleted {
                id,
                order,
                query_obj,
                order_field,
            } => {
                let id = validate_record_id(id.as_ref(), self.id_format())?;
                let rank = validate_rank("order", order.as_ref())?;
                let partition = validate_partition(query_obj.as_ref(), order_field.as_ref())?;

                let report = self.service.close_gap_on_delete(&id, rank, &partition).await?;
                Ok(OrderResponse::success(report.message()).with_shifted(report.shifted))
            }
            OrderRequest::ReorderAll {
                query_obj,
                order_field,
            } => {
                let partition = validate_partition(query_obj.as_ref(), order_field.as_ref())?;
                let report = self.service.reorder_all(&partition).await?;
                Ok(OrderResponse::success(report.message()).with_shifted(report.rewritten))
            }
            OrderRequest::Inspect {
                query_obj,
                order_field,
            } => {
                let partition = validate_partition(query_obj.as_ref(), order_field.as_ref())?;
                let health = self.service.inspect(&partition).await?;
                let message = if health.is_dense() {
                    "Partition is dense"
                } else {
                    "Partition needs reorder"
                };
                Ok(OrderResponse::success(message).with_health(health))
            }
        }
    }
}
