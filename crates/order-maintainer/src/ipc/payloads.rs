//! Request and response payloads
//!
//! Requests carry loosely-typed JSON arguments exactly as a caller supplied
//! them; the validation gate turns them into domain values. Responses always
//! use the same `{ failed, message }` shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::PartitionHealth;

// ============================================================
// INCOMING REQUESTS
// ============================================================

/// One order-maintenance request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OrderRequest {
    /// Highest rank in the partition
    MaxOrder {
        #[serde(default)]
        query_obj: Option<Value>,
        #[serde(default)]
        order_field: Option<Value>,
    },
    /// Rank for a record about to be inserted
    NextOrder {
        #[serde(default)]
        query_obj: Option<Value>,
        #[serde(default)]
        order_field: Option<Value>,
    },
    /// Shift peers so `_id` can move from `past_order` to `current_order`
    UpdateOrder {
        #[serde(rename = "_id", default)]
        id: Option<Value>,
        #[serde(default)]
        current_order: Option<Value>,
        #[serde(default)]
        past_order: Option<Value>,
        #[serde(default)]
        query_obj: Option<Value>,
        #[serde(default)]
        order_field: Option<Value>,
    },
    /// Close the gap `_id` will leave when the caller deletes it
    RemoveExceptDeleted {
        #[serde(rename = "_id", default)]
        id: Option<Value>,
        #[serde(default)]
        order: Option<Value>,
        #[serde(default)]
        query_obj: Option<Value>,
        #[serde(default)]
        order_field: Option<Value>,
    },
    /// Rewrite the partition as `1..=N`
    ReorderAll {
        #[serde(default)]
        query_obj: Option<Value>,
        #[serde(default)]
        order_field: Option<Value>,
    },
    /// Density audit
    Inspect {
        #[serde(default)]
        query_obj: Option<Value>,
        #[serde(default)]
        order_field: Option<Value>,
    },
}

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Uniform response: success value or structured failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Whether the operation failed
    pub failed: bool,
    /// Success marker or human-readable error
    pub message: String,
    /// Max (or next) order, for the rank queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_order: Option<i64>,
    /// Records whose rank was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shifted: Option<usize>,
    /// Density report, for inspect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<PartitionHealth>,
}

impl OrderResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            failed: false,
            message: message.into(),
            max_order: None,
            shifted: None,
            health: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            failed: true,
            ..Self::success(message)
        }
    }

    pub fn with_max_order(mut self, max_order: i64) -> Self {
        self.max_order = Some(max_order);
        self
    }

    pub fn with_shifted(mut self, shifted: usize) -> Self {
        self.shifted = Some(shifted);
        self
    }

    pub fn with_health(mut self, health: PartitionHealth) -> Self {
        self.health = Some(health);
        self
    }
}
